//! Error types and handling for the scoped cuckoo table
//!
//! This module defines all error types used throughout the crate. Only
//! construction-time contract violations and scope exhaustion are errors;
//! a full bucket or a lookup miss is an ordinary outcome and is reported
//! through `bool`/`Option` return values instead.

use thiserror::Error;

/// Main result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the scoped cuckoo table
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bit storage handed to a table does not match its shape
    #[error("Bit storage size mismatch: table needs {expected} bits, storage has {actual}")]
    TableSizeMismatch {
        /// Bits required by `num_buckets * tags_per_bucket * bits_per_tag`
        expected: usize,
        /// Bits actually available in the supplied storage
        actual: usize,
    },

    /// Table or encoder dimensions outside the supported range
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// Every scope id representable in `bits_per_scope` bits is taken
    #[error("Scope ids exhausted: at most {max_scopes} distinct scopes can be encoded")]
    ScopeOverflow {
        /// Number of distinct scopes the encoder can represent
        max_scopes: u64,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid shape error
    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        Self::InvalidShape(msg.into())
    }

    /// Check if this error is a programming error in the caller rather than
    /// a runtime condition
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Error::TableSizeMismatch { .. } | Error::InvalidShape(_)
        )
    }
}
