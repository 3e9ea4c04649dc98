use std::{
  io::{Read, Write},
  net::TcpStream,
  thread,
};

use portsock::{
  Descriptor, Endpoint, MAX_BACKLOG, RECV_LIMIT, RecvBuf, SockError,
  Subsystem,
};

/// Bound and listening socket on an OS-assigned loopback port.
fn loopback_listener() -> (Descriptor, Endpoint) {
  let sock = Descriptor::open_stream().expect("socket");
  sock.set_reuse_addr().expect("SO_REUSEADDR");
  sock.bind(Endpoint::loopback(0)).expect("bind");
  sock.listen(MAX_BACKLOG).expect("listen");
  let local = sock.local_endpoint().expect("getsockname");
  (sock, local)
}

#[cfg(unix)]
#[test]
fn test_open_stream_is_tcp() {
  use std::os::fd::AsRawFd;

  let _net = Subsystem::initialize();
  let sock = Descriptor::open_stream().expect("Failed to create TCP socket");
  assert!(sock.is_valid());

  let mut sock_type: i32 = 0;
  let mut len = std::mem::size_of::<i32>() as libc::socklen_t;
  let rc = unsafe {
    libc::getsockopt(
      sock.as_raw_fd(),
      libc::SOL_SOCKET,
      libc::SO_TYPE,
      &mut sock_type as *mut _ as *mut libc::c_void,
      &mut len,
    )
  };
  assert_eq!(rc, 0);
  assert_eq!(sock_type, libc::SOCK_STREAM);

  sock.close();
}

#[test]
fn test_bind_port_zero_gets_a_port() {
  let _net = Subsystem::initialize();
  let (sock, local) = loopback_listener();
  assert_ne!(local.port(), 0);
  assert_eq!(local.ip(), std::net::Ipv4Addr::LOCALHOST);
  sock.close();
}

#[test]
fn test_bind_in_use_port_fails() {
  let _net = Subsystem::initialize();
  let (first, local) = loopback_listener();

  let second = Descriptor::open_stream().expect("socket");
  let err = second.bind(local).expect_err("port is taken");
  assert!(matches!(err, SockError::Bind(_)));
  assert_ne!(err.code(), 0);
  assert_eq!(err.context(), "bind()");

  second.close();
  first.close();
}

#[test]
fn test_accept_reports_peer() {
  let _net = Subsystem::initialize();
  let (listener, local) = loopback_listener();

  let client = TcpStream::connect(std::net::SocketAddr::from(local)).unwrap();
  let client_port = client.local_addr().unwrap().port();

  let (conn, peer) = listener.accept().expect("accept");
  assert!(conn.is_valid());
  assert_eq!(peer.port(), client_port);
  assert_eq!(peer.ip(), std::net::Ipv4Addr::LOCALHOST);

  conn.close();
  listener.close();
}

#[test]
fn test_connect_send_recv() {
  let _net = Subsystem::initialize();
  let (listener, local) = loopback_listener();

  let peer = thread::spawn(move || {
    let (conn, _) = listener.accept().expect("accept");
    let mut buf = RecvBuf::new();
    conn.recv(&mut buf).expect("recv");
    conn.send(b"world").expect("send");
    buf.as_bytes().to_vec()
  });

  let sock = Descriptor::open_stream().unwrap();
  sock.connect(local).expect("connect");
  assert_eq!(sock.send(b"hello").unwrap(), 5);

  let mut reply = RecvBuf::new();
  assert_eq!(sock.recv(&mut reply).unwrap(), 5);
  assert_eq!(reply, *b"world");
  assert_eq!(reply.as_bytes_with_nul(), b"world\0");

  assert_eq!(peer.join().unwrap(), b"hello");
}

#[test]
fn test_recv_full_buffer_stays_terminated() {
  let _net = Subsystem::initialize();
  let (listener, local) = loopback_listener();

  let payload: Vec<u8> = std::iter::repeat_with(fastrand::alphanumeric)
    .take(RECV_LIMIT)
    .map(|c| c as u8)
    .collect();
  let mut client = TcpStream::connect(std::net::SocketAddr::from(local)).unwrap();
  client.write_all(&payload).unwrap();

  let (conn, _) = listener.accept().unwrap();
  let mut received = Vec::new();
  let mut buf = RecvBuf::new();
  while received.len() < RECV_LIMIT {
    let n = conn.recv(&mut buf).unwrap();
    assert!(n > 0, "peer closed early");
    assert_eq!(buf.as_bytes_with_nul().last(), Some(&0));
    received.extend_from_slice(buf.as_bytes());
  }

  assert_eq!(received, payload);
}

#[test]
fn test_recv_never_exceeds_limit() {
  let _net = Subsystem::initialize();
  let (listener, local) = loopback_listener();

  let mut client = TcpStream::connect(std::net::SocketAddr::from(local)).unwrap();
  client.write_all(&[b'z'; 200]).unwrap();

  let (conn, _) = listener.accept().unwrap();
  let mut total = 0;
  let mut buf = RecvBuf::new();
  while total < 200 {
    let n = conn.recv(&mut buf).unwrap();
    assert!(n > 0 && n <= RECV_LIMIT);
    assert_eq!(buf.len(), n);
    assert!(buf.as_bytes().iter().all(|b| *b == b'z'));
    total += n;
  }
  assert_eq!(total, 200);
}

#[test]
fn test_recv_after_peer_close_is_empty() {
  let _net = Subsystem::initialize();
  let (listener, local) = loopback_listener();

  let client = TcpStream::connect(std::net::SocketAddr::from(local)).unwrap();
  let (conn, _) = listener.accept().unwrap();
  drop(client);

  let mut buf = RecvBuf::new();
  assert_eq!(conn.recv(&mut buf).unwrap(), 0);
  assert!(buf.is_empty());
  assert_eq!(buf.as_bytes_with_nul(), b"\0");
}

#[test]
fn test_connect_without_listener_fails() {
  let _net = Subsystem::initialize();
  let port = portsock::test_utils::free_port();

  let sock = Descriptor::open_stream().unwrap();
  let err = sock.connect(Endpoint::loopback(port)).expect_err("nobody listens");
  assert!(matches!(err, SockError::Connect(_)));
  assert_eq!(err.kind(), std::io::ErrorKind::ConnectionRefused);
  assert!(err.to_string().ends_with("] connect"));
}

#[test]
fn test_send_reaches_std_peer() {
  let _net = Subsystem::initialize();
  let (listener, local) = loopback_listener();

  let mut client = TcpStream::connect(std::net::SocketAddr::from(local)).unwrap();
  let (conn, _) = listener.accept().unwrap();
  conn.send(b"world").unwrap();
  conn.close();

  let mut reply = Vec::new();
  client.read_to_end(&mut reply).unwrap();
  assert_eq!(reply, b"world");
}
