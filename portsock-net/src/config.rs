//! Command-line configuration and logging setup for the binaries.

use clap::Parser;
use portsock::{DEFAULT_PORT, Endpoint};
use tracing::{Level, Subscriber};
use tracing_subscriber::{fmt::MakeWriter, util::SubscriberInitExt};

/// Answers every "hello" with "world", one connection at a time.
#[derive(Debug, Parser)]
#[command(name = "portsock-server")]
pub struct ServerArgs {
  /// Port to listen on, on every local address.
  #[arg(long, default_value_t = DEFAULT_PORT)]
  pub port: u16,
  /// Log accept failures and socket setup details.
  #[arg(short, long)]
  pub verbose: bool,
}

impl ServerArgs {
  pub fn endpoint(&self) -> Endpoint {
    Endpoint::any(self.port)
  }
}

/// Sends "hello" to a local server and prints the reply.
#[derive(Debug, Parser)]
#[command(name = "portsock-client")]
pub struct ClientArgs {
  /// Port of the server on 127.0.0.1.
  #[arg(long, default_value_t = DEFAULT_PORT)]
  pub port: u16,
  /// Log connection details.
  #[arg(short, long)]
  pub verbose: bool,
}

impl ClientArgs {
  pub fn endpoint(&self) -> Endpoint {
    Endpoint::loopback(self.port)
  }
}

/// The binaries' subscriber: bare message lines, INFO and up unless
/// `verbose`.
pub fn subscriber<W>(
  verbose: bool,
  writer: W,
) -> impl Subscriber + Send + Sync + 'static
where
  W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
  let level = if verbose { Level::DEBUG } else { Level::INFO };
  tracing_subscriber::fmt()
    .with_writer(writer)
    .with_max_level(level)
    .with_ansi(false)
    .without_time()
    .with_target(false)
    .with_level(false)
    .finish()
}

/// Installs [`subscriber`] writing to stderr.
pub fn init_logging(verbose: bool) {
  let _ = subscriber(verbose, std::io::stderr).try_init();
}
