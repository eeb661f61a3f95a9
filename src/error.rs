//! Error types for the Falcata library.
//!
//! All fallible operations in the crate return [`Result`], whose error type
//! is the [`FalcataError`] enum. Construction errors are fatal to the call
//! that raised them and propagate to the caller; query errors are local and
//! recoverable.
//!
//! # Examples
//!
//! ```
//! use falcata::error::{FalcataError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(FalcataError::invalid_argument("Invalid input"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {e}"),
//! }
//! ```

use std::io;

use anyhow;
use thiserror::Error;

/// The main error type for Falcata operations.
#[derive(Error, Debug)]
pub enum FalcataError {
    /// I/O errors (file operations, serialization targets, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Words handed to the graph builder out of lexicographic order.
    #[error("Ordering violation: {0}")]
    OrderingViolation(String),

    /// Invalid argument supplied by the caller.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Structurally inconsistent graph arrays.
    #[error("Invalid graph data: {0}")]
    InvalidGraphData(String),

    /// Word rank outside the valid range.
    #[error("Index out of range: {0}")]
    IndexOutOfRange(String),

    /// Malformed bytes in the persisted graph format.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal consistency failure; indicates a bug, not bad input.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with [`FalcataError`].
pub type Result<T> = std::result::Result<T, FalcataError>;

impl FalcataError {
    /// Create a new ordering violation error.
    pub fn ordering_violation<S: Into<String>>(msg: S) -> Self {
        FalcataError::OrderingViolation(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        FalcataError::InvalidArgument(msg.into())
    }

    /// Create a new invalid graph data error.
    pub fn invalid_graph<S: Into<String>>(msg: S) -> Self {
        FalcataError::InvalidGraphData(msg.into())
    }

    /// Create a new index out of range error.
    pub fn index_out_of_range<S: Into<String>>(msg: S) -> Self {
        FalcataError::IndexOutOfRange(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        FalcataError::Serialization(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        FalcataError::Internal(msg.into())
    }

    /// Create a generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        FalcataError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FalcataError::ordering_violation("\"b\" does not sort after \"c\"");
        assert_eq!(
            err.to_string(),
            "Ordering violation: \"b\" does not sort after \"c\""
        );

        let err = FalcataError::index_out_of_range("rank 7 of 3");
        assert_eq!(err.to_string(), "Index out of range: rank 7 of 3");
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        let err: FalcataError = io_err.into();
        assert!(matches!(err, FalcataError::Io(_)));
    }
}
