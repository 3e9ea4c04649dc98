//! POSIX sockets.

macro_rules! syscall {
  ($fn: ident ( $($arg: expr),* $(,)* ) ) => {{
      #[allow(unused_unsafe)]
      let res = unsafe { libc::$fn($($arg, )*) };
      if res == -1 {
          Err(std::io::Error::last_os_error())
      } else {
          Ok(res)
      }
  }};
}

use std::{
  io, mem,
  net::{Ipv4Addr, SocketAddrV4},
};

use crate::endpoint::Endpoint;

/// Native socket handle.
pub type RawSocket = libc::c_int;

/// Length parameter of `accept(2)` and `getsockname(2)`.
pub type SockLen = libc::socklen_t;

pub const INVALID: RawSocket = -1;

pub const BACKLOG: i32 = libc::SOMAXCONN;

#[cfg(nosignal_flag)]
const SEND_FLAGS: libc::c_int = libc::MSG_NOSIGNAL;
#[cfg(not(nosignal_flag))]
const SEND_FLAGS: libc::c_int = 0;

/// There is no process-wide socket state to set up on POSIX.
pub fn startup() -> io::Result<()> {
  Ok(())
}

pub fn cleanup() -> io::Result<()> {
  Ok(())
}

/// Reads `errno`.
pub fn last_error() -> i32 {
  io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

pub fn stream_socket() -> io::Result<RawSocket> {
  #[cfg(cloexec_flag)]
  let fd = syscall!(socket(
    libc::AF_INET,
    libc::SOCK_STREAM | libc::SOCK_CLOEXEC,
    libc::IPPROTO_TCP
  ))?;

  #[cfg(not(cloexec_flag))]
  let fd = {
    let fd = syscall!(socket(libc::AF_INET, libc::SOCK_STREAM, libc::IPPROTO_TCP))?;
    if let Err(err) = syscall!(fcntl(fd, libc::F_SETFD, libc::FD_CLOEXEC)) {
      let _ = close(fd);
      return Err(err);
    }
    fd
  };

  if let Err(err) = disable_sigpipe(fd) {
    let _ = close(fd);
    return Err(err);
  }

  Ok(fd)
}

/// Writes to a socket whose peer went away must fail with `EPIPE` rather
/// than raise `SIGPIPE`. Linux passes `MSG_NOSIGNAL` on every send instead.
fn disable_sigpipe(#[allow(unused)] fd: RawSocket) -> io::Result<()> {
  #[cfg(nosigpipe_opt)]
  set_int_opt(fd, libc::SOL_SOCKET, libc::SO_NOSIGPIPE, 1)?;

  Ok(())
}

fn set_int_opt(
  fd: RawSocket,
  level: libc::c_int,
  name: libc::c_int,
  value: libc::c_int,
) -> io::Result<()> {
  syscall!(setsockopt(
    fd,
    level,
    name,
    &value as *const libc::c_int as *const libc::c_void,
    mem::size_of::<libc::c_int>() as SockLen
  ))
  .map(drop)
}

pub fn set_reuse_addr(fd: RawSocket) -> io::Result<()> {
  set_int_opt(fd, libc::SOL_SOCKET, libc::SO_REUSEADDR, 1)
}

pub fn bind(fd: RawSocket, endpoint: Endpoint) -> io::Result<()> {
  let addr = into_raw(endpoint);
  syscall!(bind(
    fd,
    &addr as *const libc::sockaddr_in as *const libc::sockaddr,
    mem::size_of::<libc::sockaddr_in>() as SockLen
  ))
  .map(drop)
}

pub fn listen(fd: RawSocket, backlog: i32) -> io::Result<()> {
  syscall!(listen(fd, backlog)).map(drop)
}

pub fn accept(fd: RawSocket) -> io::Result<(RawSocket, Endpoint)> {
  // SAFETY: all-zero is a valid sockaddr_in.
  let mut addr: libc::sockaddr_in = unsafe { mem::zeroed() };
  let mut len = mem::size_of::<libc::sockaddr_in>() as SockLen;
  let addr_ptr = &mut addr as *mut libc::sockaddr_in as *mut libc::sockaddr;

  #[cfg(cloexec_flag)]
  let conn = syscall!(accept4(fd, addr_ptr, &mut len, libc::SOCK_CLOEXEC))?;

  #[cfg(not(cloexec_flag))]
  let conn = {
    let conn = syscall!(accept(fd, addr_ptr, &mut len))?;
    if let Err(err) = syscall!(fcntl(conn, libc::F_SETFD, libc::FD_CLOEXEC)) {
      let _ = close(conn);
      return Err(err);
    }
    conn
  };

  match from_raw(&addr) {
    Some(peer) => Ok((conn, peer)),
    None => {
      let _ = close(conn);
      Err(io::Error::from_raw_os_error(libc::EAFNOSUPPORT))
    }
  }
}

pub fn connect(fd: RawSocket, endpoint: Endpoint) -> io::Result<()> {
  let addr = into_raw(endpoint);
  syscall!(connect(
    fd,
    &addr as *const libc::sockaddr_in as *const libc::sockaddr,
    mem::size_of::<libc::sockaddr_in>() as SockLen
  ))
  .map(drop)
}

pub fn send(fd: RawSocket, data: &[u8]) -> io::Result<usize> {
  syscall!(send(
    fd,
    data.as_ptr() as *const libc::c_void,
    data.len(),
    SEND_FLAGS
  ))
  .map(|n| n as usize)
}

pub fn recv(fd: RawSocket, buf: &mut [u8]) -> io::Result<usize> {
  syscall!(recv(fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len(), 0))
    .map(|n| n as usize)
}

pub fn local_endpoint(fd: RawSocket) -> io::Result<Endpoint> {
  // SAFETY: all-zero is a valid sockaddr_in.
  let mut addr: libc::sockaddr_in = unsafe { mem::zeroed() };
  let mut len = mem::size_of::<libc::sockaddr_in>() as SockLen;
  syscall!(getsockname(
    fd,
    &mut addr as *mut libc::sockaddr_in as *mut libc::sockaddr,
    &mut len
  ))?;

  from_raw(&addr)
    .ok_or_else(|| io::Error::from_raw_os_error(libc::EAFNOSUPPORT))
}

pub fn close(fd: RawSocket) -> io::Result<()> {
  syscall!(close(fd)).map(drop)
}

pub(crate) fn into_raw(endpoint: Endpoint) -> libc::sockaddr_in {
  // SAFETY: sockaddr_in only has integer fields, so zeroing also clears
  // sin_zero.
  let mut addr: libc::sockaddr_in = unsafe { mem::zeroed() };

  #[cfg(sin_len)]
  {
    addr.sin_len = mem::size_of::<libc::sockaddr_in>() as u8;
  }
  addr.sin_family = libc::AF_INET as libc::sa_family_t;
  addr.sin_port = endpoint.port().to_be();
  addr.sin_addr = libc::in_addr { s_addr: u32::from(endpoint.ip()).to_be() };

  addr
}

pub(crate) fn from_raw(addr: &libc::sockaddr_in) -> Option<Endpoint> {
  if addr.sin_family != libc::AF_INET as libc::sa_family_t {
    return None;
  }

  let ip = Ipv4Addr::from(u32::from_be(addr.sin_addr.s_addr));
  Some(Endpoint::from(SocketAddrV4::new(ip, u16::from_be(addr.sin_port))))
}
