//! Core storage for the smelter server.
//!
//! This crate owns the set data type and the keyspace it lives in:
//!
//! - **IntSet**: packed sorted array of i64 for all-integer sets
//! - **HtSet**: hash set of byte strings with O(1) random selection
//! - **Set**: tagged union over the two encodings with one-way promotion
//! - **Db**: the keyspace mapping keys to typed values, plus the dirty
//!   counter and keyspace-event sink every mutation reports through
//!
//! Command semantics (replies, replication rewrites) live in the `server`
//! crate; this crate only provides the data structures and their invariants.

pub mod config;
pub mod error;
pub mod events;
pub mod glob;
pub mod htset;
pub mod intset;
pub mod keyspace;
pub mod set;
pub mod value;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use events::{Event, EventClass, EventSink, NullSink, RecordingSink};
pub use htset::HtSet;
pub use intset::IntSet;
pub use keyspace::{Db, Object};
pub use set::{Element, Encoding, Set};
