//! Error types for keyspace operations.

use std::fmt;

/// Errors that can occur when a command touches the keyspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// The key exists but holds a value of another type.
    WrongType,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongType => write!(f, "operation against a key holding the wrong kind of value"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Result type for keyspace operations.
pub type StoreResult<T> = Result<T, StoreError>;
