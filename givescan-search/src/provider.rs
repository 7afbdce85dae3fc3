//! Trait definition for pluggable organization data providers.
//!
//! Each provider (Overpass, Google Places, Charity Navigator, ProPublica)
//! implements [`ProviderAdapter`] to map its own API contract onto
//! [`NormalizedRecord`].

use async_trait::async_trait;

use crate::error::ScanError;
use crate::types::{NormalizedRecord, Query, Source};

/// A pluggable organization data provider.
///
/// Implementors are constructed once with their credentials, endpoint and
/// a shared HTTP client, then queried concurrently. Each handles its own:
///
/// - enablement check (credentials present, free text present when required)
/// - request construction (keyword chain, radius unit and cap)
/// - decoding into a private response schema
/// - mapping rows to [`NormalizedRecord`] and dropping rows without coordinates
///
/// A disabled provider must return `Ok(vec![])` from [`fetch`](Self::fetch)
/// without performing I/O. Transport and decoding failures are returned as
/// errors; the orchestrator isolates them.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Which provider this adapter represents.
    fn source(&self) -> Source;

    /// Whether this adapter can answer `query` with its current configuration.
    fn is_enabled(&self, query: &Query) -> bool;

    /// Fetch and normalize the provider's records for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if the request fails, the response cannot be
    /// decoded, or the provider reports an error in its payload.
    async fn fetch(&self, query: &Query) -> Result<Vec<NormalizedRecord>, ScanError>;
}

/// Drop every record whose coordinates are not both finite.
pub fn retain_geocoded(source: Source, mut records: Vec<NormalizedRecord>) -> Vec<NormalizedRecord> {
    let before = records.len();
    records.retain(NormalizedRecord::is_geocoded);
    let dropped = before - records.len();
    if dropped > 0 {
        tracing::debug!(%source, dropped, kept = records.len(), "dropped records without coordinates");
    }
    records
}
