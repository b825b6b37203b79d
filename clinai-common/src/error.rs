//! Common error types for Clinical AI

use thiserror::Error;

/// Common result type for Clinical AI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Clinical AI crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Patient input outside the accepted bounds
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Feature schema artifact missing, unreadable or malformed
    #[error("Schema error: {0}")]
    Schema(String),

    /// Model artifact missing, unreadable or incompatible with the schema
    #[error("Model error: {0}")]
    Model(String),

    /// Scoring failed or produced an unusable probability
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// Feature vector does not match the schema the oracle was trained with
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// Report document could not be assembled
    #[error("Report error: {0}")]
    Report(String),
}

impl Error {
    /// True for failures caused by the caller's input rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}
