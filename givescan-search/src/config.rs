//! Scan configuration with sensible defaults.
//!
//! [`ScanConfig`] is built once at startup and threaded into every provider
//! adapter at construction. Nothing in this crate reads the environment.

use crate::error::ScanError;
use crate::types::Source;

/// Credentials for the providers that require them. A `None` (or blank)
/// value silently disables the corresponding provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderCredentials {
    /// Google Places API key.
    pub google_places_api_key: Option<String>,
    /// Charity Navigator application id.
    pub charity_navigator_app_id: Option<String>,
    /// Charity Navigator application key.
    pub charity_navigator_app_key: Option<String>,
    /// ProPublica Nonprofit Explorer API key.
    pub propublica_api_key: Option<String>,
}

/// Base URLs of the provider APIs. Overridable for mirrors and tests.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    /// Overpass API instance (the adapter appends `/api/interpreter`).
    pub overpass: String,
    /// Google Maps platform host.
    pub google_places: String,
    /// Charity Navigator API host.
    pub charity_navigator: String,
    /// ProPublica projects host.
    pub propublica: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            overpass: "https://overpass-api.de".into(),
            google_places: "https://maps.googleapis.com".into(),
            charity_navigator: "https://api.charitynavigator.org".into(),
            propublica: "https://projects.propublica.org".into(),
        }
    }
}

/// Configuration for a scan.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Providers to query, in registration order. Earlier providers win
    /// when two records share a dedupe key.
    pub providers: Vec<Source>,
    /// Maximum number of records returned after deduplication.
    pub max_results: usize,
    /// Lower bound for the search radius in kilometres.
    pub min_radius_km: f64,
    /// Upper bound for the search radius in kilometres.
    pub max_radius_km: f64,
    /// Radius used when the query omits one or supplies garbage.
    pub default_radius_km: f64,
    /// Per-provider deadline in seconds, covering the whole adapter call.
    pub provider_timeout_seconds: u64,
    /// Server-side timeout requested from Overpass, in seconds.
    pub overpass_timeout_seconds: u64,
    /// Custom User-Agent for provider requests.
    pub user_agent: Option<String>,
    /// Provider credentials.
    pub credentials: ProviderCredentials,
    /// Provider base URLs.
    pub endpoints: ProviderEndpoints,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            providers: Source::all().to_vec(),
            max_results: 150,
            min_radius_km: 1.0,
            max_radius_km: 50.0,
            default_radius_km: 25.0,
            provider_timeout_seconds: 10,
            overpass_timeout_seconds: 25,
            user_agent: None,
            credentials: ProviderCredentials::default(),
            endpoints: ProviderEndpoints::default(),
        }
    }
}

impl ScanConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `providers` must not be empty and must not repeat a provider
    /// - `max_results` and `provider_timeout_seconds` must be greater than 0
    /// - `0 < min_radius_km <= default_radius_km <= max_radius_km`, all finite
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.providers.is_empty() {
            return Err(ScanError::Config(
                "at least one provider must be registered".into(),
            ));
        }
        for (i, source) in self.providers.iter().enumerate() {
            if self.providers[..i].contains(source) {
                return Err(ScanError::Config(format!(
                    "provider {source} registered more than once"
                )));
            }
        }
        if self.max_results == 0 {
            return Err(ScanError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.provider_timeout_seconds == 0 {
            return Err(ScanError::Config(
                "provider_timeout_seconds must be greater than 0".into(),
            ));
        }
        let radii = [self.min_radius_km, self.default_radius_km, self.max_radius_km];
        if radii.iter().any(|r| !r.is_finite()) || self.min_radius_km <= 0.0 {
            return Err(ScanError::Config(
                "radius bounds must be finite and positive".into(),
            ));
        }
        if self.min_radius_km > self.default_radius_km
            || self.default_radius_km > self.max_radius_km
        {
            return Err(ScanError::Config(
                "radius bounds must satisfy min <= default <= max".into(),
            ));
        }
        Ok(())
    }
}

/// Treat blank credential strings as absent.
pub(crate) fn credential(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
