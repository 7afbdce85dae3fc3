//! Error types for the givescan service.

use givescan_search::ScanError;

/// Top-level error type for the HTTP service.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid environment configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The listener could not bind its address.
    #[error("bind error: {0}")]
    Bind(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Scan pipeline error.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ServerError>;
