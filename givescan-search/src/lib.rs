//! # givescan-search
//!
//! Finds charitable and social-service organizations around a point by
//! querying several independent directories at once and merging their
//! answers into one deduplicated, size-bounded list.
//!
//! ## Design
//!
//! - Providers: OpenStreetMap (Overpass), Google Places, Charity Navigator,
//!   ProPublica Nonprofit Explorer
//! - Every provider maps its own response shape onto [`NormalizedRecord`]
//! - Providers are queried concurrently, each under its own timeout
//! - Graceful degradation: if some providers fail, the others still answer
//! - Records are merged in registration order; earlier providers win
//!   deduplication conflicts
//!
//! ## Security
//!
//! - Credentials come from [`ScanConfig`]; nothing here reads the environment
//! - Error messages never include request URLs (which may carry keys)
//! - Query text is logged only at trace level

pub mod categories;
pub mod config;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod provider;
pub mod providers;
pub mod query;
pub mod types;

use tokio_util::sync::CancellationToken;

pub use config::{ProviderCredentials, ProviderEndpoints, ScanConfig};
pub use error::{Result, ScanError};
pub use provider::ProviderAdapter;
pub use query::{ScanParams, COORDINATES_REQUIRED};
pub use types::{NormalizedRecord, Query, ScanOutcome, Source};

/// A validated configuration together with its adapter registry.
///
/// Build once and share: the registry holds one pooled HTTP client used
/// by every adapter.
pub struct Scanner {
    config: ScanConfig,
    adapters: Vec<Box<dyn ProviderAdapter>>,
}

impl Scanner {
    /// Validate `config` and build one adapter per registered provider.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if the configuration is invalid or the
    /// HTTP client cannot be constructed.
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        let client = http::build_client(&config)?;
        let adapters = providers::build_adapters(&config, client);
        Ok(Self { config, adapters })
    }

    /// Build a scanner around an explicit adapter registry, in registration
    /// order. `config.providers` is not consulted for adapter construction.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if the configuration is invalid.
    pub fn with_adapters(config: ScanConfig, adapters: Vec<Box<dyn ProviderAdapter>>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, adapters })
    }

    /// The configuration this scanner was built with.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Providers in registration order.
    pub fn sources(&self) -> Vec<Source> {
        self.adapters.iter().map(|a| a.source()).collect()
    }

    /// Answer one query. See [`orchestrator::scan::run_scan`].
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Validation`] if the coordinates are unusable.
    pub async fn scan(&self, params: &ScanParams, cancel: &CancellationToken) -> Result<ScanOutcome> {
        orchestrator::scan::run_scan(params, &self.adapters, &self.config, cancel).await
    }
}

/// Scan with a one-off [`Scanner`] built from `config`.
///
/// # Errors
///
/// Returns [`ScanError::Config`] for an invalid configuration and
/// [`ScanError::Validation`] for unusable coordinates. Provider failures
/// are logged and never fail the scan.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> givescan_search::Result<()> {
/// let params = givescan_search::ScanParams {
///     lat: Some("39.95".into()),
///     lng: Some("-75.16".into()),
///     radius_km: Some("10".into()),
///     ..Default::default()
/// };
/// let outcome = givescan_search::scan(&params, &givescan_search::ScanConfig::default()).await?;
/// for record in &outcome.results {
///     println!("{} ({})", record.name, record.source);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn scan(params: &ScanParams, config: &ScanConfig) -> Result<ScanOutcome> {
    let scanner = Scanner::new(config.clone())?;
    scanner.scan(params, &CancellationToken::new()).await
}
