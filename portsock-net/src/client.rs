//! Client role.

use portsock::{Descriptor, Endpoint, OrFatal, RecvBuf, SockError};

use crate::exchange;

/// Opens a stream socket and connects it to `endpoint`.
///
/// The socket is closed again if the connect fails.
pub fn try_connect(endpoint: Endpoint) -> Result<Descriptor, SockError> {
  let sock = Descriptor::open_stream()?;
  sock.connect(endpoint)?;
  Ok(sock)
}

/// Like [`try_connect`], but any failure terminates the process.
///
/// There is no retry and no timeout. The caller owns the returned descriptor.
pub fn connect_to(endpoint: Endpoint) -> Descriptor {
  let sock = portsock::open_stream_socket();
  sock.connect(endpoint).or_fatal();
  sock
}

/// One full client session: connect, send the request, read the reply,
/// close. Every failure on the way is fatal.
pub fn run(endpoint: Endpoint) -> RecvBuf {
  let sock = connect_to(endpoint);
  tracing::debug!("connected to {endpoint}");
  session(sock)
}

/// Runs the exchange on an already connected socket and closes it.
///
/// A failed write aborts with context `write`, a failed read with `read`.
pub fn session(sock: Descriptor) -> RecvBuf {
  let reply = exchange::request(&sock).or_fatal();
  sock.close();
  reply
}
