//! The only place that knows which socket API the target speaks.
//!
//! Both backends expose the same free functions over [`RawSocket`], each
//! returning [`std::io::Result`] with the platform error code captured at
//! the failure point.

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::*;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::*;
