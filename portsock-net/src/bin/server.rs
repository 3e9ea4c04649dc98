use clap::Parser;
use portsock::{OrFatal, Subsystem};
use portsock_net::{
  AcceptLoop, Listener,
  config::{self, ServerArgs},
};

fn main() {
  let args = ServerArgs::parse();
  config::init_logging(args.verbose);

  // Never torn down: the accept loop only ends with the process.
  let _net = Subsystem::initialize();

  let listener = Listener::open()
    .or_fatal()
    .bind(args.endpoint())
    .or_fatal()
    .listen()
    .or_fatal();

  let local = listener.local_endpoint().unwrap_or(args.endpoint());
  tracing::info!("listening on {local}");

  AcceptLoop::new(listener).run()
}
