//! The single exit for unrecoverable socket failures.
//!
//! Every fatal condition ends up in [`abort_with`], which writes one
//! `[<code>] <context>` line to standard error and aborts. Aborting skips
//! destructors, so no descriptor is closed twice on the way out.

use std::{
  io::{self, Write},
  process,
};

use crate::{error::SockError, sys};

/// Reports the last platform socket error with `context` and aborts.
///
/// Reads `WSAGetLastError()` on Windows and `errno` elsewhere, so it must be
/// called directly after the failing call. Code that already holds a
/// [`SockError`] should use [`die`] instead.
pub fn fatal(context: &str) -> ! {
  abort_with(sys::last_error(), context)
}

/// Reports `err` and aborts.
pub fn die(err: SockError) -> ! {
  abort_with(err.code(), err.context())
}

/// Writes the diagnostic line the fatal path prints.
pub fn write_fatal_line<W: Write>(
  out: &mut W,
  code: i32,
  context: &str,
) -> io::Result<()> {
  writeln!(out, "[{code}] {context}")?;
  out.flush()
}

fn abort_with(code: i32, context: &str) -> ! {
  let _ = write_fatal_line(&mut io::stderr().lock(), code, context);
  process::abort()
}

/// Turns a failed socket operation into a fatal one.
///
/// ```no_run
/// use portsock::{Descriptor, OrFatal};
///
/// let sock = Descriptor::open_stream().or_fatal();
/// sock.close();
/// ```
pub trait OrFatal<T> {
  fn or_fatal(self) -> T;
}

impl<T> OrFatal<T> for Result<T, SockError> {
  fn or_fatal(self) -> T {
    match self {
      Ok(value) => value,
      Err(err) => die(err),
    }
  }
}
