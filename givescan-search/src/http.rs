//! Shared HTTP client for provider requests.
//!
//! One [`reqwest::Client`] is built per process and shared by every
//! adapter; it pools connections internally and is cheap to clone.

use crate::config::ScanConfig;
use crate::error::ScanError;
use std::time::Duration;

/// User-Agent sent when the configuration does not override it.
pub const DEFAULT_USER_AGENT: &str = concat!("givescan/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] configured for provider API calls.
///
/// The client has:
/// - Request timeout from `config.provider_timeout_seconds`
/// - User-Agent from config, or [`DEFAULT_USER_AGENT`]
/// - gzip decompression
///
/// # Errors
///
/// Returns [`ScanError::Config`] if the client cannot be constructed.
pub fn build_client(config: &ScanConfig) -> Result<reqwest::Client, ScanError> {
    let ua = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.provider_timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| ScanError::Config(format!("failed to build HTTP client: {e}")))
}

/// Map a transport failure to a [`ScanError`] without leaking the request URL,
/// which may carry credentials in its query string.
pub(crate) fn transport_error(source: &str, err: reqwest::Error) -> ScanError {
    let err = err.without_url();
    if err.is_timeout() {
        ScanError::Timeout(format!("{source} request timed out"))
    } else if let Some(status) = err.status() {
        ScanError::Http(format!("{source} returned {status}"))
    } else if err.is_decode() {
        ScanError::Parse(format!("{source} response could not be decoded: {err}"))
    } else {
        ScanError::Http(format!("{source} request failed: {err}"))
    }
}
