use std::io;

use thiserror::Error;

/// A failed socket operation together with the platform error code that
/// caused it.
///
/// The `Display` form is the diagnostic line written by the fatal path,
/// `[<code>] <context>`.
///
/// Whether an error ends the process or only the current iteration is up to
/// the caller: a failed read kills the client but the server keeps serving.
#[derive(Debug, Error)]
pub enum SockError {
  #[error("[{}] WSAStartup", os_code(.0))]
  Startup(#[source] io::Error),
  #[error("[{}] socket()", os_code(.0))]
  SocketCreation(#[source] io::Error),
  #[error("[{}] connect", os_code(.0))]
  Connect(#[source] io::Error),
  #[error("[{}] bind()", os_code(.0))]
  Bind(#[source] io::Error),
  #[error("[{}] listen()", os_code(.0))]
  Listen(#[source] io::Error),
  #[error("[{}] accept()", os_code(.0))]
  Accept(#[source] io::Error),
  #[error("[{}] read", os_code(.0))]
  Read(#[source] io::Error),
  #[error("[{}] write", os_code(.0))]
  Write(#[source] io::Error),
}

fn os_code(err: &io::Error) -> i32 {
  err.raw_os_error().unwrap_or(0)
}

impl SockError {
  /// Raw platform error code (`errno` or `WSAGetLastError`), or 0 when the
  /// error did not come from the OS.
  pub fn code(&self) -> i32 {
    os_code(self.io_error())
  }

  /// The operation that failed, as printed on the diagnostic line.
  pub fn context(&self) -> &'static str {
    match self {
      SockError::Startup(_) => "WSAStartup",
      SockError::SocketCreation(_) => "socket()",
      SockError::Connect(_) => "connect",
      SockError::Bind(_) => "bind()",
      SockError::Listen(_) => "listen()",
      SockError::Accept(_) => "accept()",
      SockError::Read(_) => "read",
      SockError::Write(_) => "write",
    }
  }

  pub fn io_error(&self) -> &io::Error {
    match self {
      SockError::Startup(err)
      | SockError::SocketCreation(err)
      | SockError::Connect(err)
      | SockError::Bind(err)
      | SockError::Listen(err)
      | SockError::Accept(err)
      | SockError::Read(err)
      | SockError::Write(err) => err,
    }
  }

  pub fn kind(&self) -> io::ErrorKind {
    self.io_error().kind()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_is_the_fatal_line() {
    let err = SockError::Connect(io::Error::from_raw_os_error(111));
    assert_eq!(err.to_string(), "[111] connect");
    assert_eq!(err.code(), 111);
    assert_eq!(err.context(), "connect");
  }

  #[test]
  fn non_os_errors_report_zero() {
    let err = SockError::Read(io::Error::other("short"));
    assert_eq!(err.code(), 0);
    assert_eq!(err.to_string(), "[0] read");
  }

  #[test]
  fn source_is_the_io_error() {
    use std::error::Error as _;

    let err = SockError::Bind(io::Error::from_raw_os_error(98));
    let source = err.source().expect("bind error has a source");
    assert!(source.downcast_ref::<io::Error>().is_some());
  }
}
