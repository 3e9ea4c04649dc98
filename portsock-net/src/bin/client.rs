use std::process::ExitCode;

use clap::Parser;
use portsock::Subsystem;
use portsock_net::{
  client,
  config::{self, ClientArgs},
};

fn main() -> ExitCode {
  let args = ClientArgs::parse();
  config::init_logging(args.verbose);

  let net = Subsystem::initialize();
  let reply = client::run(args.endpoint());
  println!("server says: {}", reply.as_text());
  net.teardown();

  ExitCode::SUCCESS
}
