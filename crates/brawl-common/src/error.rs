//! Error types for Brawl.

use thiserror::Error;

/// Top-level error type for Brawl operations.
#[derive(Debug, Error)]
pub enum BrawlError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be used
    #[error("Config error: {0}")]
    Config(String),

    /// Move data failed validation
    #[error("Move data error: {0}")]
    MoveData(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Schema version mismatch
    #[error("Schema version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Expected version
        expected: String,
        /// Actual version found
        actual: String,
    },
}

/// Result type alias for Brawl operations.
pub type BrawlResult<T> = Result<T, BrawlError>;
