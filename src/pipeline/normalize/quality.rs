//! Data-quality flagging. Flags are machine-readable warning codes attached
//! non-fatally to a record; they never fail an ingestion.

use crate::domain::{RecordFragment, Severity};

pub const MISSING_COORDINATES: &str = "missing_coordinates";
pub const MISSING_TIMESTAMP: &str = "missing_timestamp";
pub const UNKNOWN_SEVERITY: &str = "unknown_severity";
pub const EMPTY_SUMMARY: &str = "empty_summary";
/// Emitted by metric validation, appended after the flags above.
pub const INVALID_METRIC_TYPE: &str = "invalid_metric_type";

/// Inspect a fragment (before metric flags are merged) and derive its
/// completeness warnings, always in this fixed order.
pub fn collect_flags(fragment: &RecordFragment) -> Vec<String> {
    let mut flags = Vec::new();
    if fragment.location.lat.is_none() || fragment.location.lon.is_none() {
        flags.push(MISSING_COORDINATES.to_string());
    }
    if fragment.event_time.as_deref().map_or(true, str::is_empty) {
        flags.push(MISSING_TIMESTAMP.to_string());
    }
    if fragment.severity == Severity::Unknown {
        flags.push(UNKNOWN_SEVERITY.to_string());
    }
    if fragment.summary.trim().is_empty() {
        flags.push(EMPTY_SUMMARY.to_string());
    }
    flags
}

/// Merge quality flags with metric-validation flags, deduplicating while
/// preserving first-occurrence order.
pub fn merge_flags(quality: Vec<String>, metric: Vec<String>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for flag in quality.into_iter().chain(metric) {
        if !merged.contains(&flag) {
            merged.push(flag);
        }
    }
    merged
}
