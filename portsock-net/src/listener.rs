//! Server role.
//!
//! A listening socket moves through `Created → Bound → Listening` and then
//! stays in the Accepting state for the rest of the process:
//!
//! ```text
//!  Listener<Created> --bind()--> Listener<Bound> --listen()--> Listener<Listening>
//!                                                                    |
//!                                                            AcceptLoop::new()
//!                                                                    v
//!                       +------------- accept failed --------- Accepting <-+
//!                       |                                        |         |
//!                       +--------------------------------------->+  served |
//!                                                                +---------+
//! ```
//!
//! Each state is its own type, so `listen()` on an unbound socket or
//! `accept()` on one that is not listening does not compile. Accepting has
//! no exit: [`AcceptLoop::run`] returns `!`, and the process ends only from
//! outside.
//!
//! ```no_run
//! use portsock::{Endpoint, OrFatal, Subsystem};
//! use portsock_net::listener::{AcceptLoop, Listener};
//!
//! let _net = Subsystem::initialize();
//! let listener = Listener::open()
//!     .and_then(|l| l.bind(Endpoint::any(1234)))
//!     .and_then(|l| l.listen())
//!     .or_fatal();
//! AcceptLoop::new(listener).run()
//! ```

use std::marker::PhantomData;

use crossbeam_channel::Sender;
use portsock::{Descriptor, Endpoint, MAX_BACKLOG, RecvBuf, SockError};

use crate::exchange;

/// Socket is open with `SO_REUSEADDR` requested.
#[derive(Debug)]
pub enum Created {}
/// Socket has a local address.
#[derive(Debug)]
pub enum Bound {}
/// Socket is queueing incoming connections.
#[derive(Debug)]
pub enum Listening {}

#[derive(Debug)]
pub struct Listener<S> {
  sock: Descriptor,
  _state: PhantomData<S>,
}

impl<S> Listener<S> {
  fn into_state<T>(self) -> Listener<T> {
    Listener { sock: self.sock, _state: PhantomData }
  }
}

impl Listener<Created> {
  /// Opens the socket and asks for address reuse.
  ///
  /// `SO_REUSEADDR` only lets a restarted server rebind while old
  /// connections sit in TIME_WAIT, so failing to set it is not an error.
  pub fn open() -> Result<Self, SockError> {
    let sock = Descriptor::open_stream()?;
    if let Err(err) = sock.set_reuse_addr() {
      tracing::debug!("SO_REUSEADDR not set: {err}");
    }
    Ok(Listener { sock, _state: PhantomData })
  }

  pub fn bind(self, endpoint: Endpoint) -> Result<Listener<Bound>, SockError> {
    self.sock.bind(endpoint)?;
    Ok(self.into_state())
  }
}

impl Listener<Bound> {
  /// Starts listening with the platform's largest backlog.
  pub fn listen(self) -> Result<Listener<Listening>, SockError> {
    self.sock.listen(MAX_BACKLOG)?;
    Ok(self.into_state())
  }
}

impl Listener<Listening> {
  /// Opens, binds and listens in one go.
  pub fn serve_on(endpoint: Endpoint) -> Result<Self, SockError> {
    Listener::open()?.bind(endpoint)?.listen()
  }

  /// The bound address, with the real port when port 0 was requested.
  pub fn local_endpoint(&self) -> std::io::Result<Endpoint> {
    self.sock.local_endpoint()
  }
}

/// Source of accepted connections for an [`AcceptLoop`].
pub trait Acceptor {
  /// Blocks until a peer connects.
  fn accept(&self) -> Result<(Descriptor, Endpoint), SockError>;
}

impl Acceptor for Listener<Listening> {
  fn accept(&self) -> Result<(Descriptor, Endpoint), SockError> {
    self.sock.accept()
  }
}

impl<A: Acceptor> Acceptor for &A {
  fn accept(&self) -> Result<(Descriptor, Endpoint), SockError> {
    (**self).accept()
  }
}

/// What one pass through the Accepting state did.
#[derive(Debug)]
pub enum ServerEvent {
  /// A peer connected and got its answer.
  Served { peer: Endpoint, request: RecvBuf },
  /// A peer connected but the exchange broke off. The connection was closed.
  ExchangeFailed { peer: Endpoint, error: SockError },
  /// `accept` failed. Nothing was consumed; the next pass tries again.
  AcceptFailed(SockError),
}

/// The Accepting state.
///
/// Connections are served one at a time: the next `accept` happens only
/// after the previous connection is answered and closed.
pub struct AcceptLoop<A> {
  acceptor: A,
  events: Option<Sender<ServerEvent>>,
}

impl<A: Acceptor> AcceptLoop<A> {
  pub fn new(acceptor: A) -> Self {
    Self { acceptor, events: None }
  }

  /// Forwards every [`ServerEvent`] produced by [`AcceptLoop::run`].
  ///
  /// The loop carries on if the receiving side hangs up.
  pub fn with_events(mut self, events: Sender<ServerEvent>) -> Self {
    self.events = Some(events);
    self
  }

  /// Accepts one connection and serves it.
  ///
  /// Never fails: a failed accept or exchange is logged at warn level and
  /// reported in the returned event, and the loop stays in the Accepting
  /// state.
  pub fn step(&mut self) -> ServerEvent {
    let (conn, peer) = match self.acceptor.accept() {
      Ok(accepted) => accepted,
      Err(error) => {
        tracing::warn!("accept() failed: {error}");
        return ServerEvent::AcceptFailed(error);
      }
    };

    let outcome = exchange::respond(&conn);
    conn.close();

    match outcome {
      Ok(request) => ServerEvent::Served { peer, request },
      Err(error @ SockError::Read(_)) => {
        tracing::warn!("read() error");
        tracing::debug!("read from {peer} failed: {error}");
        ServerEvent::ExchangeFailed { peer, error }
      }
      Err(error) => {
        tracing::warn!("{error} to {peer}");
        ServerEvent::ExchangeFailed { peer, error }
      }
    }
  }

  /// Serves connections until the process is terminated.
  pub fn run(mut self) -> ! {
    loop {
      let event = self.step();
      let delivered = match &self.events {
        Some(events) => events.send(event).is_ok(),
        None => true,
      };
      if !delivered {
        self.events = None;
      }
    }
  }
}
