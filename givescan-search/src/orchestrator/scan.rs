//! Core scan pipeline: validate, fan out, deduplicate, cap.
//!
//! Provider faults are absorbed by the fan-out; only validation and
//! configuration problems surface as errors.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::provider::ProviderAdapter;
use crate::query::{validate_query, ScanParams};
use crate::types::ScanOutcome;

use super::cap::cap_results;
use super::dedup::deduplicate;
use super::fan_out::fan_out;

/// Run one scan against a prepared adapter registry.
///
/// # Pipeline
///
/// 1. Validate `params` into a [`Query`](crate::types::Query); reject
///    before any provider runs if the coordinates are unusable
/// 2. Fan out to every adapter concurrently, each bounded by
///    `config.provider_timeout_seconds` and by `cancel`
/// 3. Deduplicate, first record per key wins
/// 4. Cap to `config.max_results`
///
/// # Errors
///
/// Returns [`ScanError::Validation`] for bad coordinates and
/// [`ScanError::Config`] for an invalid configuration. Provider failures
/// never fail the scan; if all providers fail the outcome is empty.
pub async fn run_scan(
    params: &ScanParams,
    adapters: &[Box<dyn ProviderAdapter>],
    config: &ScanConfig,
    cancel: &CancellationToken,
) -> Result<ScanOutcome, ScanError> {
    config.validate()?;
    let query = validate_query(params, config)?;
    tracing::trace!(?query, "scan query validated");

    let timeout = Duration::from_secs(config.provider_timeout_seconds);
    let merged = fan_out(adapters, &query, timeout, cancel).await;
    let raw = merged.records.len();

    let deduped = deduplicate(merged.records);
    let unique = deduped.len();

    let outcome = cap_results(deduped, config.max_results, query.radius_km);
    tracing::info!(
        raw,
        unique,
        count = outcome.count,
        failed = merged.failed.len(),
        radius_km = query.radius_km,
        "scan complete"
    );
    Ok(outcome)
}
