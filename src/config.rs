//! Service configuration, read once from the environment at startup.
//!
//! | variable | default |
//! |---|---|
//! | `GIVESCAN_HOST` | `0.0.0.0` |
//! | `PORT` | `3000` |
//! | `GMAPS_KEY` | unset |
//! | `CN_ID`, `CN_KEY` | unset |
//! | `PP_API_KEY` | unset |
//! | `GIVESCAN_MAX_RADIUS_KM` | `50` |
//! | `GIVESCAN_MAX_RESULTS` | `150` |
//! | `GIVESCAN_PROVIDER_TIMEOUT_SECS` | `10` |
//! | `GIVESCAN_OVERPASS_URL` | `https://overpass-api.de` |
//!
//! Blank values count as absent.

use std::str::FromStr;

use givescan_search::ScanConfig;

use crate::error::{Result, ServerError};

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 3000;

/// Configuration for [`ScanServer`](crate::server::ScanServer).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind.
    pub host: String,
    /// Port to bind (`0` picks a free port).
    pub port: u16,
    /// Scan pipeline configuration, including provider credentials.
    pub scan: ScanConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            scan: ScanConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] if a numeric variable does not parse
    /// or the resulting scan configuration is invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ServerConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();
        if let Some(host) = var("GIVESCAN_HOST") {
            config.host = host;
        }
        if let Some(port) = parse_var("PORT", var("PORT"))? {
            config.port = port;
        }

        let scan = &mut config.scan;
        scan.credentials.google_places_api_key = var("GMAPS_KEY");
        scan.credentials.charity_navigator_app_id = var("CN_ID");
        scan.credentials.charity_navigator_app_key = var("CN_KEY");
        scan.credentials.propublica_api_key = var("PP_API_KEY");

        if let Some(max_radius) = parse_var("GIVESCAN_MAX_RADIUS_KM", var("GIVESCAN_MAX_RADIUS_KM"))? {
            scan.max_radius_km = max_radius;
            scan.default_radius_km = scan.default_radius_km.min(max_radius);
            scan.min_radius_km = scan.min_radius_km.min(max_radius);
        }
        if let Some(max_results) = parse_var("GIVESCAN_MAX_RESULTS", var("GIVESCAN_MAX_RESULTS"))? {
            scan.max_results = max_results;
        }
        if let Some(secs) = parse_var(
            "GIVESCAN_PROVIDER_TIMEOUT_SECS",
            var("GIVESCAN_PROVIDER_TIMEOUT_SECS"),
        )? {
            scan.provider_timeout_seconds = secs;
        }
        if let Some(url) = var("GIVESCAN_OVERPASS_URL") {
            scan.endpoints.overpass = url.trim_end_matches('/').to_owned();
        }

        config
            .scan
            .validate()
            .map_err(|e| ServerError::Config(e.to_string()))?;
        Ok(config)
    }

    /// `host:port` string suitable for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(name: &str, value: Option<String>) -> Result<Option<T>> {
    value
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| ServerError::Config(format!("{name} is not a valid number: {v:?}")))
        })
        .transpose()
}
