//! Helpers for integration tests.

use std::net::{Ipv4Addr, TcpListener};

/// A loopback port that was free a moment ago.
///
/// Binds port 0, reads what the OS picked and releases it again, so nothing
/// is listening there when this returns.
#[doc(hidden)]
pub fn free_port() -> u16 {
  TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
    .and_then(|listener| listener.local_addr())
    .map(|addr| addr.port())
    .expect("no free loopback port")
}

/// Number of descriptors currently open in this process.
#[doc(hidden)]
#[cfg(linux)]
pub fn open_descriptor_count() -> usize {
  std::fs::read_dir("/proc/self/fd")
    .expect("/proc/self/fd is readable")
    .count()
}
