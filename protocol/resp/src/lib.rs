//! RESP wire protocol for the smelter server.
//!
//! - [`command::parse_frame`]: zero-copy framing of one command
//! - [`command::Command`]: typed commands built from an argument vector
//! - [`reply::Reply`]: RESP reply writer, including deferred multi-bulk
//!   lengths for replies whose cardinality is known only after traversal

pub mod command;
pub mod error;
pub mod reply;

pub use command::{parse_frame, Command, Frame, MAX_BULK_LEN};
pub use error::{CommandError, ParseError};
pub use reply::{DeferredLen, Reply};
