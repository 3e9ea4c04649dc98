use std::{
  fmt,
  net::{AddrParseError, Ipv4Addr, SocketAddr, SocketAddrV4},
  str::FromStr,
};

/// Port shared by the client and the server.
pub const DEFAULT_PORT: u16 = 1234;

/// An IPv4 address and port.
///
/// ```
/// use portsock::{Endpoint, DEFAULT_PORT};
///
/// let target = Endpoint::loopback(DEFAULT_PORT);
/// assert_eq!(target.to_string(), "127.0.0.1:1234");
/// assert_eq!(Endpoint::any(DEFAULT_PORT).to_string(), "0.0.0.0:1234");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
  ip: Ipv4Addr,
  port: u16,
}

impl Endpoint {
  pub const fn new(ip: Ipv4Addr, port: u16) -> Self {
    Self { ip, port }
  }

  /// `127.0.0.1:port`, the client's target.
  pub const fn loopback(port: u16) -> Self {
    Self::new(Ipv4Addr::LOCALHOST, port)
  }

  /// `0.0.0.0:port`, the server's bind address.
  pub const fn any(port: u16) -> Self {
    Self::new(Ipv4Addr::UNSPECIFIED, port)
  }

  pub const fn ip(&self) -> Ipv4Addr {
    self.ip
  }

  pub const fn port(&self) -> u16 {
    self.port
  }

  pub const fn with_port(self, port: u16) -> Self {
    Self::new(self.ip, port)
  }
}

impl From<SocketAddrV4> for Endpoint {
  fn from(addr: SocketAddrV4) -> Self {
    Self::new(*addr.ip(), addr.port())
  }
}

impl From<Endpoint> for SocketAddrV4 {
  fn from(endpoint: Endpoint) -> Self {
    SocketAddrV4::new(endpoint.ip, endpoint.port)
  }
}

impl From<Endpoint> for SocketAddr {
  fn from(endpoint: Endpoint) -> Self {
    SocketAddr::V4(endpoint.into())
  }
}

impl FromStr for Endpoint {
  type Err = AddrParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    s.parse::<SocketAddrV4>().map(Endpoint::from)
  }
}

impl fmt::Display for Endpoint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.ip, self.port)
  }
}
