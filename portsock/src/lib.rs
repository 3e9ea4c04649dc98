#![cfg_attr(docsrs, feature(doc_cfg))]

//! # portsock - one socket API for POSIX and WinSock
//!
//! portsock is a small blocking TCP layer that hides the differences between
//! the POSIX sockets API and Windows Sockets behind one set of types:
//!
//! - [`Descriptor`]: the socket handle, with a single [`Descriptor::INVALID`]
//!   sentinel on every platform.
//! - [`Subsystem`]: `WSAStartup`/`WSACleanup` on Windows, nothing elsewhere.
//! - [`SockError`]: a failed operation plus the platform error code.
//! - [`fatal`], [`die`] and [`OrFatal`]: the one way to stop the process on
//!   an unrecoverable error.
//!
//! ## Platform support
//!
//! | Platform   | API                | Last error          |
//! |------------|--------------------|---------------------|
//! | Linux      | BSD sockets        | `errno`             |
//! | macOS/BSD  | BSD sockets        | `errno`             |
//! | Windows    | WinSock 2.2        | `WSAGetLastError()` |
//!
//! All platform branching lives in the private `sys` module. Nothing outside
//! it looks at native error state or native types directly.
//!
//! ## Error Handling
//!
//! Every operation returns `Result<_, SockError>`. The error carries the
//! platform code captured right after the failing call, and its `Display`
//! form is the `[<code>] <context>` line the fatal path prints.

mod buf;
mod descriptor;
mod endpoint;
mod error;
mod fatal;
mod subsystem;
mod sys;

#[doc(hidden)]
pub mod test_utils;

pub use buf::{RECV_CAPACITY, RECV_LIMIT, RecvBuf};
pub use descriptor::{Descriptor, MAX_BACKLOG, open_stream_socket};
pub use endpoint::{DEFAULT_PORT, Endpoint};
pub use error::SockError;
pub use fatal::{OrFatal, die, fatal, write_fatal_line};
pub use subsystem::Subsystem;
pub use sys::{RawSocket, SockLen};
