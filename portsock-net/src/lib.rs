//! Hello/world client and server built on [`portsock`].
//!
//! - [`client`]: connect to the server and run one exchange.
//! - [`listener`]: the server's `Created → Bound → Listening → Accepting`
//!   state machine.
//! - [`exchange`]: the fixed request and response.
//! - [`config`]: command-line arguments and log setup for the binaries.
//!
//! Everything is blocking and single-threaded. The server answers one
//! connection completely before it accepts the next.

pub mod client;
pub mod config;
pub mod exchange;
pub mod listener;

pub use listener::{AcceptLoop, Acceptor, Listener, ServerEvent};
