//! The socket handle shared by every platform.
//!
//! [`Descriptor`] wraps the native handle (`int` on POSIX, `SOCKET` on
//! Windows). It holds either a live handle or [`Descriptor::INVALID`], and it
//! owns what it holds: the handle is released by [`Descriptor::close`] or,
//! if that was never called, when the descriptor is dropped. Either way it
//! is released exactly once.
//!
//! ```no_run
//! use portsock::{Descriptor, Endpoint, RecvBuf, SockError, Subsystem};
//!
//! fn ask(target: Endpoint) -> Result<RecvBuf, SockError> {
//!     let sock = Descriptor::open_stream()?;
//!     sock.connect(target)?;
//!     sock.send(b"hello")?;
//!
//!     let mut reply = RecvBuf::new();
//!     sock.recv(&mut reply)?;
//!     sock.close();
//!     Ok(reply)
//! }
//!
//! let _net = Subsystem::initialize();
//! let reply = ask(Endpoint::loopback(1234)).unwrap();
//! println!("{}", reply.as_text());
//! ```

use std::{fmt, io, mem};

use crate::{
  buf::RecvBuf,
  endpoint::Endpoint,
  error::SockError,
  fatal::OrFatal,
  sys::{self, RawSocket},
};

/// Listen backlog used by the server: the platform's `SOMAXCONN`.
pub const MAX_BACKLOG: i32 = sys::BACKLOG;

pub struct Descriptor(RawSocket);

impl Descriptor {
  /// The sentinel native value for "no socket".
  pub const INVALID: RawSocket = sys::INVALID;

  /// A descriptor holding the sentinel. Closing or dropping it does nothing.
  pub const fn invalid() -> Self {
    Descriptor(sys::INVALID)
  }

  /// Opens an IPv4 stream socket.
  pub fn open_stream() -> Result<Self, SockError> {
    sys::stream_socket().map(Descriptor).map_err(SockError::SocketCreation)
  }

  /// Takes ownership of a native handle.
  ///
  /// # Safety
  ///
  /// `raw` must be an open socket (or the sentinel) that nothing else will
  /// close.
  pub unsafe fn from_raw(raw: RawSocket) -> Self {
    Descriptor(raw)
  }

  pub fn as_raw(&self) -> RawSocket {
    self.0
  }

  /// Gives up ownership without closing.
  pub fn into_raw(self) -> RawSocket {
    let raw = self.0;
    mem::forget(self);
    raw
  }

  pub fn is_valid(&self) -> bool {
    self.0 != sys::INVALID
  }

  /// Enables `SO_REUSEADDR`.
  pub fn set_reuse_addr(&self) -> io::Result<()> {
    sys::set_reuse_addr(self.0)
  }

  pub fn bind(&self, endpoint: Endpoint) -> Result<(), SockError> {
    sys::bind(self.0, endpoint).map_err(SockError::Bind)
  }

  pub fn listen(&self, backlog: i32) -> Result<(), SockError> {
    sys::listen(self.0, backlog).map_err(SockError::Listen)
  }

  /// Blocks until a peer connects.
  pub fn accept(&self) -> Result<(Descriptor, Endpoint), SockError> {
    let (raw, peer) = sys::accept(self.0).map_err(SockError::Accept)?;
    Ok((Descriptor(raw), peer))
  }

  pub fn connect(&self, endpoint: Endpoint) -> Result<(), SockError> {
    sys::connect(self.0, endpoint).map_err(SockError::Connect)
  }

  /// One send call. Returns how many bytes the OS took.
  pub fn send(&self, data: &[u8]) -> Result<usize, SockError> {
    sys::send(self.0, data).map_err(SockError::Write)
  }

  /// One receive call into a freshly zeroed `buf`.
  ///
  /// At most [`RECV_LIMIT`](crate::RECV_LIMIT) bytes are read, so the
  /// contents stay NUL-terminated. A return of 0 means the peer closed the
  /// connection.
  pub fn recv(&self, buf: &mut RecvBuf) -> Result<usize, SockError> {
    buf.clear();
    let n = sys::recv(self.0, buf.spare_mut()).map_err(SockError::Read)?;
    buf.commit(n);
    Ok(n)
  }

  /// Address the socket is bound to. Useful after binding port 0.
  pub fn local_endpoint(&self) -> io::Result<Endpoint> {
    sys::local_endpoint(self.0)
  }

  /// Releases the handle back to the OS.
  pub fn close(mut self) {
    self.release();
  }

  fn release(&mut self) {
    if !self.is_valid() {
      return;
    }

    let raw = mem::replace(&mut self.0, sys::INVALID);
    if let Err(err) = sys::close(raw) {
      tracing::debug!("close({raw:?}) failed: {err}");
    }
  }
}

/// Opens an IPv4 stream socket or terminates the process.
pub fn open_stream_socket() -> Descriptor {
  Descriptor::open_stream().or_fatal()
}

impl Drop for Descriptor {
  fn drop(&mut self) {
    self.release();
  }
}

impl fmt::Debug for Descriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_valid() {
      f.debug_tuple("Descriptor").field(&self.0).finish()
    } else {
      f.write_str("Descriptor(INVALID)")
    }
  }
}

#[cfg(unix)]
impl std::os::fd::AsRawFd for Descriptor {
  fn as_raw_fd(&self) -> std::os::fd::RawFd {
    self.0
  }
}

#[cfg(unix)]
impl std::os::fd::IntoRawFd for Descriptor {
  fn into_raw_fd(self) -> std::os::fd::RawFd {
    self.into_raw()
  }
}

#[cfg(windows)]
impl std::os::windows::io::AsRawSocket for Descriptor {
  fn as_raw_socket(&self) -> std::os::windows::io::RawSocket {
    self.0 as std::os::windows::io::RawSocket
  }
}

#[cfg(windows)]
impl std::os::windows::io::IntoRawSocket for Descriptor {
  fn into_raw_socket(self) -> std::os::windows::io::RawSocket {
    self.into_raw() as std::os::windows::io::RawSocket
  }
}
