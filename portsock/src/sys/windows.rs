//! Windows Sockets 2.

use std::{
  io, mem,
  net::{Ipv4Addr, SocketAddrV4},
};

use windows_sys::Win32::Networking::WinSock as ws;

use crate::endpoint::Endpoint;

/// Calls a WinSock function and turns `SOCKET_ERROR` into the code reported
/// by `WSAGetLastError`.
macro_rules! wsacall {
  ($fn: ident ( $($arg: expr),* $(,)* ) ) => {{
      #[allow(unused_unsafe)]
      let res = unsafe { ws::$fn($($arg, )*) };
      if res == ws::SOCKET_ERROR {
          Err(last_io_error())
      } else {
          Ok(res)
      }
  }};
}

/// Native socket handle.
pub type RawSocket = ws::SOCKET;

/// Length parameter of `accept` and `getsockname`.
pub type SockLen = i32;

pub const INVALID: RawSocket = ws::INVALID_SOCKET;

pub const BACKLOG: i32 = ws::SOMAXCONN as i32;

/// Requested WinSock version, 2.2.
const WINSOCK_VERSION: u16 = 0x0202;

pub fn startup() -> io::Result<()> {
  // SAFETY: WSADATA is plain data filled in by WSAStartup.
  let mut data: ws::WSADATA = unsafe { mem::zeroed() };
  // WSAStartup returns the error code directly instead of setting it.
  let code = unsafe { ws::WSAStartup(WINSOCK_VERSION, &mut data) };
  if code != 0 { Err(io::Error::from_raw_os_error(code)) } else { Ok(()) }
}

pub fn cleanup() -> io::Result<()> {
  wsacall!(WSACleanup()).map(drop)
}

pub fn last_error() -> i32 {
  unsafe { ws::WSAGetLastError() }
}

fn last_io_error() -> io::Error {
  io::Error::from_raw_os_error(last_error())
}

pub fn stream_socket() -> io::Result<RawSocket> {
  let sock =
    unsafe { ws::socket(ws::AF_INET as i32, ws::SOCK_STREAM, ws::IPPROTO_TCP) };
  if sock == INVALID { Err(last_io_error()) } else { Ok(sock) }
}

pub fn set_reuse_addr(sock: RawSocket) -> io::Result<()> {
  let value: i32 = 1;
  wsacall!(setsockopt(
    sock,
    ws::SOL_SOCKET,
    ws::SO_REUSEADDR,
    &value as *const i32 as *const u8,
    mem::size_of::<i32>() as i32
  ))
  .map(drop)
}

pub fn bind(sock: RawSocket, endpoint: Endpoint) -> io::Result<()> {
  let addr = into_raw(endpoint);
  wsacall!(bind(
    sock,
    &addr as *const ws::SOCKADDR_IN as *const ws::SOCKADDR,
    mem::size_of::<ws::SOCKADDR_IN>() as i32
  ))
  .map(drop)
}

pub fn listen(sock: RawSocket, backlog: i32) -> io::Result<()> {
  wsacall!(listen(sock, backlog)).map(drop)
}

pub fn accept(sock: RawSocket) -> io::Result<(RawSocket, Endpoint)> {
  // SAFETY: all-zero is a valid SOCKADDR_IN.
  let mut addr: ws::SOCKADDR_IN = unsafe { mem::zeroed() };
  let mut len = mem::size_of::<ws::SOCKADDR_IN>() as SockLen;

  let conn = unsafe {
    ws::accept(
      sock,
      &mut addr as *mut ws::SOCKADDR_IN as *mut ws::SOCKADDR,
      &mut len,
    )
  };
  if conn == INVALID {
    return Err(last_io_error());
  }

  match from_raw(&addr) {
    Some(peer) => Ok((conn, peer)),
    None => {
      let _ = close(conn);
      Err(io::Error::from_raw_os_error(ws::WSAEAFNOSUPPORT))
    }
  }
}

pub fn connect(sock: RawSocket, endpoint: Endpoint) -> io::Result<()> {
  let addr = into_raw(endpoint);
  // connect() insists on the exact structure length here.
  wsacall!(connect(
    sock,
    &addr as *const ws::SOCKADDR_IN as *const ws::SOCKADDR,
    mem::size_of::<ws::SOCKADDR_IN>() as i32
  ))
  .map(drop)
}

pub fn send(sock: RawSocket, data: &[u8]) -> io::Result<usize> {
  let len = i32::try_from(data.len()).unwrap_or(i32::MAX);
  wsacall!(send(sock, data.as_ptr(), len, 0)).map(|n| n as usize)
}

pub fn recv(sock: RawSocket, buf: &mut [u8]) -> io::Result<usize> {
  let len = i32::try_from(buf.len()).unwrap_or(i32::MAX);
  wsacall!(recv(sock, buf.as_mut_ptr(), len, 0)).map(|n| n as usize)
}

pub fn local_endpoint(sock: RawSocket) -> io::Result<Endpoint> {
  // SAFETY: all-zero is a valid SOCKADDR_IN.
  let mut addr: ws::SOCKADDR_IN = unsafe { mem::zeroed() };
  let mut len = mem::size_of::<ws::SOCKADDR_IN>() as SockLen;
  wsacall!(getsockname(
    sock,
    &mut addr as *mut ws::SOCKADDR_IN as *mut ws::SOCKADDR,
    &mut len
  ))?;

  from_raw(&addr)
    .ok_or_else(|| io::Error::from_raw_os_error(ws::WSAEAFNOSUPPORT))
}

pub fn close(sock: RawSocket) -> io::Result<()> {
  wsacall!(closesocket(sock)).map(drop)
}

pub(crate) fn into_raw(endpoint: Endpoint) -> ws::SOCKADDR_IN {
  // SAFETY: SOCKADDR_IN is plain data; zeroing also clears sin_zero.
  let mut addr: ws::SOCKADDR_IN = unsafe { mem::zeroed() };
  addr.sin_family = ws::AF_INET;
  addr.sin_port = endpoint.port().to_be();
  addr.sin_addr = ws::IN_ADDR {
    S_un: ws::IN_ADDR_0 { S_addr: u32::from(endpoint.ip()).to_be() },
  };
  addr
}

pub(crate) fn from_raw(addr: &ws::SOCKADDR_IN) -> Option<Endpoint> {
  if addr.sin_family != ws::AF_INET {
    return None;
  }

  // SAFETY: every IN_ADDR_0 variant is a view of the same four bytes.
  let s_addr = unsafe { addr.sin_addr.S_un.S_addr };
  let ip = Ipv4Addr::from(u32::from_be(s_addr));
  Some(Endpoint::from(SocketAddrV4::new(ip, u16::from_be(addr.sin_port))))
}
