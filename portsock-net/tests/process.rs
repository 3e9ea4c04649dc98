//! Drives the real binaries. The server never exits on its own, so each test
//! kills it once the assertions are done.

use std::{
  io::{BufRead, BufReader, Read},
  process::{Child, ChildStderr, Command, Output, Stdio},
};

use portsock::test_utils::free_port;

const SERVER: &str = env!("CARGO_BIN_EXE_portsock-server");
const CLIENT: &str = env!("CARGO_BIN_EXE_portsock-client");

struct Server {
  child: Child,
  stderr: BufReader<ChildStderr>,
}

impl Server {
  /// Starts the server and waits until it reports that it is listening.
  fn start(port: u16) -> Server {
    let mut child = Command::new(SERVER)
      .args(["--port", &port.to_string()])
      .stderr(Stdio::piped())
      .spawn()
      .expect("server starts");
    let mut stderr = BufReader::new(child.stderr.take().unwrap());

    let mut line = String::new();
    loop {
      line.clear();
      let n = stderr.read_line(&mut line).expect("server stderr");
      assert!(n > 0, "server exited before listening");
      if line.contains("listening on") {
        break;
      }
    }

    Server { child, stderr }
  }

  /// Kills the server and returns everything it logged after startup.
  fn stop(mut self) -> String {
    let _ = self.child.kill();
    let _ = self.child.wait();
    let mut rest = String::new();
    let _ = self.stderr.read_to_string(&mut rest);
    rest
  }
}

fn run_client(port: u16) -> Output {
  Command::new(CLIENT)
    .args(["--port", &port.to_string()])
    .output()
    .expect("client runs")
}

/// Extracts the code from a `[<code>] <context>` line.
fn fatal_code(line: &str) -> Option<i32> {
  let rest = line.strip_prefix('[')?;
  let (code, _) = rest.split_once(']')?;
  code.parse().ok()
}

#[test]
fn test_client_gets_world() {
  let port = free_port();
  let server = Server::start(port);

  let output = run_client(port);
  let log = server.stop();

  assert!(output.status.success(), "client failed: {output:?}");
  assert_eq!(String::from_utf8_lossy(&output.stdout), "server says: world\n");
  assert!(log.contains("client says: hello"), "server log: {log}");
}

#[test]
fn test_two_clients_in_a_row() {
  let port = free_port();
  let server = Server::start(port);

  let first = run_client(port);
  let second = run_client(port);
  let log = server.stop();

  for output in [&first, &second] {
    assert!(output.status.success(), "client failed: {output:?}");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "server says: world\n");
  }
  assert_eq!(log.matches("client says: hello").count(), 2, "server log: {log}");
}

#[test]
fn test_client_without_server_aborts() {
  let port = free_port();
  let output = run_client(port);

  assert!(!output.status.success());
  #[cfg(unix)]
  {
    use std::os::unix::process::ExitStatusExt;
    assert!(output.status.signal().is_some(), "expected abort: {output:?}");
  }

  let stderr = String::from_utf8_lossy(&output.stderr);
  let line = stderr
    .lines()
    .find(|line| line.ends_with("] connect"))
    .unwrap_or_else(|| panic!("no fatal line in {stderr:?}"));
  let code = fatal_code(line).expect("line starts with [code]");
  assert_ne!(code, 0);
  assert!(output.stdout.is_empty());
}

// WinSock lets SO_REUSEADDR take over a port that is already listening.
#[cfg(not(windows))]
#[test]
fn test_second_server_on_same_port_aborts() {
  let port = free_port();
  let server = Server::start(port);

  let output = Command::new(SERVER)
    .args(["--port", &port.to_string()])
    .output()
    .expect("second server runs");
  server.stop();

  assert!(!output.status.success());
  let stderr = String::from_utf8_lossy(&output.stderr);
  let line = stderr
    .lines()
    .find(|line| line.ends_with("] bind()"))
    .unwrap_or_else(|| panic!("no fatal line in {stderr:?}"));
  assert_ne!(fatal_code(line), Some(0));
}
