//! Query validation: raw string parameters in, a [`Query`] with finite
//! coordinates and a clamped radius out.

use serde::Deserialize;

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::types::Query;

/// Message returned to callers whose coordinates are missing or malformed.
pub const COORDINATES_REQUIRED: &str = "lat,lng required";

/// Raw, unvalidated query parameters as they arrive on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanParams {
    /// Latitude, decimal degrees.
    pub lat: Option<String>,
    /// Longitude, decimal degrees.
    pub lng: Option<String>,
    /// Search radius in kilometres.
    pub radius_km: Option<String>,
    /// Free-text search term.
    pub q: Option<String>,
    /// Category hint.
    pub category: Option<String>,
}

/// Validate raw parameters into a [`Query`].
///
/// # Errors
///
/// Returns [`ScanError::Validation`] if `lat` or `lng` is missing,
/// unparsable or non-finite. The radius never causes an error: missing or
/// malformed values fall back to `config.default_radius_km`, and numeric
/// values are clamped into `[config.min_radius_km, config.max_radius_km]`.
pub fn validate_query(params: &ScanParams, config: &ScanConfig) -> Result<Query, ScanError> {
    let (Some(lat), Some(lng)) = (parse_finite(&params.lat), parse_finite(&params.lng)) else {
        return Err(ScanError::Validation(COORDINATES_REQUIRED.into()));
    };

    let radius_km = parse_finite(&params.radius_km)
        .map(|r| r.clamp(config.min_radius_km, config.max_radius_km))
        .unwrap_or(config.default_radius_km);

    Ok(Query {
        lat,
        lng,
        radius_km,
        q: non_blank(&params.q),
        category: non_blank(&params.category),
    })
}

fn parse_finite(raw: &Option<String>) -> Option<f64> {
    raw.as_deref()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn non_blank(raw: &Option<String>) -> Option<String> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
