//! Error types for the givescan-search crate.
//!
//! All errors use stable string messages suitable for logging. Provider
//! credentials never appear in error messages: request URLs carrying keys
//! are not formatted into them.

/// Errors that can occur while answering a scan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The incoming query was malformed (missing or non-finite coordinates).
    #[error("invalid query: {0}")]
    Validation(String),

    /// An HTTP request to a provider failed or returned an error status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A provider response could not be decoded into its expected schema.
    #[error("parse error: {0}")]
    Parse(String),

    /// A provider answered, but reported an error in its payload.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// A provider did not settle within the per-provider timeout.
    #[error("provider timed out: {0}")]
    Timeout(String),

    /// The scan was cancelled before the provider settled.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Invalid scan configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl ScanError {
    /// Whether this error was caused by the caller's input rather than by
    /// the service itself.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Convenience type alias for givescan-search results.
pub type Result<T> = std::result::Result<T, ScanError>;
