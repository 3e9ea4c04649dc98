//! The one-shot hello/world exchange.
//!
//! There is no framing: each side makes exactly one send and one receive
//! call, bounded by a [`RecvBuf`].

use portsock::{Descriptor, RecvBuf, SockError};

/// Client to server.
pub const REQUEST: &[u8] = b"hello";

/// Server to client.
pub const RESPONSE: &[u8] = b"world";

/// Server side: read the request, then answer with [`RESPONSE`].
///
/// A failed read ends the exchange without an answer. Neither a read nor a
/// write failure is fatal to a server.
pub fn respond(conn: &Descriptor) -> Result<RecvBuf, SockError> {
  let mut request = RecvBuf::new();
  conn.recv(&mut request)?;
  tracing::info!("client says: {}", request.as_text());
  conn.send(RESPONSE)?;
  Ok(request)
}

/// Client side: send [`REQUEST`], then read the reply.
pub fn request(conn: &Descriptor) -> Result<RecvBuf, SockError> {
  conn.send(REQUEST)?;

  let mut reply = RecvBuf::new();
  conn.recv(&mut reply)?;
  Ok(reply)
}
