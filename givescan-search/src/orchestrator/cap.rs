//! Result capping and outcome metadata.

use crate::types::{NormalizedRecord, ScanOutcome, Source};

/// Truncate `records` to `max_results` and wrap them with their metadata.
///
/// `count` is the size of the returned list, i.e. measured after
/// deduplication and after the cap. `sources` lists the providers present
/// in the returned list, in order of first appearance.
pub fn cap_results(
    mut records: Vec<NormalizedRecord>,
    max_results: usize,
    radius_km: f64,
) -> ScanOutcome {
    records.truncate(max_results);

    let mut sources: Vec<Source> = Vec::new();
    for record in &records {
        if !sources.contains(&record.source) {
            sources.push(record.source);
        }
    }

    ScanOutcome {
        count: records.len(),
        results: records,
        sources,
        radius_km,
    }
}
