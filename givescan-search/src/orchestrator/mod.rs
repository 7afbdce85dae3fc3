//! Scan orchestrator: concurrent fan-out, dedup, cap.
//!
//! This module fans a validated query out to every registered provider,
//! concatenates their records in registration order, deduplicates with a
//! first-wins rule and truncates to the configured maximum.

pub mod cap;
pub mod dedup;
pub mod fan_out;
pub mod scan;
