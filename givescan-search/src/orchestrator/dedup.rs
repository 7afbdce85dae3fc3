//! First-wins deduplication by record identity.
//!
//! The key is the record `id` when it is non-empty, otherwise the
//! lowercased `name|address` pair. The first record seen for a key is
//! kept, so providers registered earlier take priority over later ones.

use std::collections::HashSet;

use crate::types::NormalizedRecord;

/// Compute the dedupe key for a record.
pub fn dedupe_key(record: &NormalizedRecord) -> String {
    if record.id.is_empty() {
        format!(
            "{}|{}",
            record.name.to_lowercase(),
            record.address.to_lowercase()
        )
    } else {
        record.id.clone()
    }
}

/// Drop every record whose key was already seen, preserving order.
///
/// Idempotent: deduplicating the output again returns it unchanged.
pub fn deduplicate(records: Vec<NormalizedRecord>) -> Vec<NormalizedRecord> {
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(dedupe_key(record)))
        .collect()
}
