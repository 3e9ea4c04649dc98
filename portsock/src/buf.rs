//! Fixed-size receive buffer.
//!
//! A [`RecvBuf`] goes through the same three steps on every read:
//!
//! 1. **Clear**: all [`RECV_CAPACITY`] bytes are zeroed.
//! 2. **Fill**: at most `RECV_CAPACITY - 1` bytes are handed to `recv`.
//! 3. **Commit**: the byte count is recorded.
//!
//! Since the last byte is never handed out, the filled region is always
//! followed by at least one NUL, so the contents can be treated as bounded
//! text.
//!
//! With the `zeroize` feature, clearing and dropping scrub the array with
//! [`zeroize`] so the compiler cannot elide the writes.

use std::{borrow::Cow, fmt};

/// Total size of the receive buffer, terminator included.
pub const RECV_CAPACITY: usize = 64;

/// Largest number of bytes a single read may store.
pub const RECV_LIMIT: usize = RECV_CAPACITY - 1;

pub struct RecvBuf {
  data: [u8; RECV_CAPACITY],
  len: usize,
}

impl RecvBuf {
  pub const fn new() -> Self {
    Self { data: [0; RECV_CAPACITY], len: 0 }
  }

  /// Zeroes the whole array and forgets the previous contents.
  pub fn clear(&mut self) {
    #[cfg(feature = "zeroize")]
    zeroize::Zeroize::zeroize(&mut self.data);
    #[cfg(not(feature = "zeroize"))]
    self.data.fill(0);

    self.len = 0;
  }

  /// Region a read may write into. Excludes the terminator slot.
  pub(crate) fn spare_mut(&mut self) -> &mut [u8] {
    &mut self.data[..RECV_LIMIT]
  }

  /// Records that `len` bytes were stored by the last read.
  ///
  /// `len` is bounded by the [`RecvBuf::spare_mut`] slice the read was given,
  /// so it never exceeds [`RECV_LIMIT`]. The terminator slot stays out of
  /// reach even if it did.
  pub(crate) fn commit(&mut self, len: usize) {
    debug_assert!(len <= RECV_LIMIT, "read of {len} bytes overran the buffer");
    self.len = len.min(RECV_LIMIT);
  }

  /// Bytes stored by the last read, without padding.
  pub fn as_bytes(&self) -> &[u8] {
    &self.data[..self.len]
  }

  /// Bytes stored by the last read followed by their NUL terminator.
  pub fn as_bytes_with_nul(&self) -> &[u8] {
    &self.data[..=self.len]
  }

  pub fn as_text(&self) -> Cow<'_, str> {
    String::from_utf8_lossy(self.as_bytes())
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }
}

impl Default for RecvBuf {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for RecvBuf {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RecvBuf")
      .field("len", &self.len)
      .field("text", &self.as_text())
      .finish()
  }
}

impl PartialEq<[u8]> for RecvBuf {
  fn eq(&self, other: &[u8]) -> bool {
    self.as_bytes() == other
  }
}

impl<const N: usize> PartialEq<[u8; N]> for RecvBuf {
  fn eq(&self, other: &[u8; N]) -> bool {
    self.as_bytes() == other
  }
}

#[cfg(feature = "zeroize")]
#[cfg_attr(docsrs, doc(cfg(feature = "zeroize")))]
impl Drop for RecvBuf {
  fn drop(&mut self) {
    zeroize::Zeroize::zeroize(&mut self.data);
  }
}

#[cfg(feature = "bytes")]
#[cfg_attr(docsrs, doc(cfg(feature = "bytes")))]
impl From<&RecvBuf> for bytes::Bytes {
  fn from(buf: &RecvBuf) -> Self {
    bytes::Bytes::copy_from_slice(buf.as_bytes())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  fn filled(payload: &[u8]) -> RecvBuf {
    let mut buf = RecvBuf::new();
    buf.clear();
    let n = payload.len().min(RECV_LIMIT);
    buf.spare_mut()[..n].copy_from_slice(&payload[..n]);
    buf.commit(n);
    buf
  }

  #[test]
  fn spare_excludes_terminator() {
    let mut buf = RecvBuf::new();
    assert_eq!(buf.spare_mut().len(), 63);
  }

  #[test]
  fn full_read_stays_terminated() {
    let payload = [b'x'; RECV_LIMIT];
    let buf = filled(&payload);
    assert_eq!(buf.len(), 63);
    assert_eq!(buf.as_bytes(), &payload[..]);
    assert_eq!(buf.as_bytes_with_nul().last(), Some(&0));
  }

  #[test]
  fn clear_drops_stale_bytes() {
    let mut buf = filled(b"a longer message");
    buf.clear();
    buf.spare_mut()[..2].copy_from_slice(b"hi");
    buf.commit(2);
    assert_eq!(buf, *b"hi");
    assert_eq!(buf.as_bytes_with_nul(), b"hi\0");
  }

  #[cfg(debug_assertions)]
  #[test]
  #[should_panic(expected = "overran")]
  fn commit_past_limit_panics() {
    RecvBuf::new().commit(RECV_CAPACITY);
  }

  #[cfg(not(debug_assertions))]
  #[test]
  fn commit_past_limit_keeps_terminator() {
    let mut buf = RecvBuf::new();
    buf.commit(RECV_CAPACITY);
    assert_eq!(buf.len(), RECV_LIMIT);
    assert_eq!(buf.as_bytes_with_nul().last(), Some(&0));
  }

  #[cfg(feature = "bytes")]
  #[test]
  fn converts_into_bytes() {
    let buf = filled(b"world");
    assert_eq!(bytes::Bytes::from(&buf), bytes::Bytes::from_static(b"world"));
  }

  proptest! {
    #[test]
    fn everything_after_the_read_is_zero(
      payload in proptest::collection::vec(1u8..=255, 0..=RECV_LIMIT)
    ) {
      let buf = filled(&payload);
      prop_assert_eq!(buf.as_bytes(), &payload[..]);
      prop_assert!(buf.data[payload.len()..].iter().all(|b| *b == 0));
    }
  }
}
