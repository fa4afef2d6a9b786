//! Error types and result alias for metronome-core.
//!
//! Configuration problems are surfaced at definition time so a misconfigured
//! scheme can never silently produce wrong partitions; lookup misses are
//! surfaced to the caller because they indicate a consistency problem between
//! stored keys and the live definition.

/// The result type used throughout metronome-core.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when defining or querying a partition scheme.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An offset was supplied that is invalid for the cadence.
    #[error("invalid offset configuration: {message}")]
    InvalidOffset {
        /// Description of what made the offset invalid.
        message: String,
    },

    /// A partition key does not correspond to any boundary of the scheme.
    #[error("unknown partition key: {key}")]
    UnknownPartitionKey {
        /// The key that was looked up.
        key: String,
    },
}

impl Error {
    /// Creates a new invalid-offset error.
    #[must_use]
    pub fn invalid_offset(message: impl Into<String>) -> Self {
        Self::InvalidOffset {
            message: message.into(),
        }
    }

    /// Creates a new unknown-partition-key error.
    #[must_use]
    pub fn unknown_partition_key(key: impl Into<String>) -> Self {
        Self::UnknownPartitionKey { key: key.into() }
    }
}
