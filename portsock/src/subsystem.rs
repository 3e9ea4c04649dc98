//! Process-wide socket subsystem lifetime.
//!
//! WinSock refuses every call until `WSAStartup` has succeeded and expects a
//! matching `WSACleanup` once the last socket is gone. POSIX has no such
//! requirement, so both steps compile to nothing there.

use crate::{error::SockError, fatal::OrFatal, sys};

/// Proof that the platform socket subsystem is up.
///
/// Create one at the top of `main` and keep it alive until every
/// [`Descriptor`](crate::Descriptor) is closed. Teardown happens on
/// [`Subsystem::teardown`] or on drop, whichever comes first, and is
/// best-effort.
#[derive(Debug)]
#[must_use = "the subsystem is torn down when this value is dropped"]
pub struct Subsystem {
  active: bool,
}

impl Subsystem {
  pub fn init() -> Result<Self, SockError> {
    sys::startup().map_err(SockError::Startup)?;
    Ok(Subsystem { active: true })
  }

  /// Like [`Subsystem::init`] but a failure terminates the process.
  pub fn initialize() -> Self {
    Self::init().or_fatal()
  }

  pub fn teardown(mut self) {
    self.shutdown();
  }

  fn shutdown(&mut self) {
    if !std::mem::replace(&mut self.active, false) {
      return;
    }

    if let Err(err) = sys::cleanup() {
      tracing::debug!("socket subsystem teardown failed: {err}");
    }
  }
}

impl Drop for Subsystem {
  fn drop(&mut self) {
    self.shutdown();
  }
}
