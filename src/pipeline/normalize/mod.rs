//! Profile-driven normalization of raw provider payloads.
//!
//! One polymorphic pass covers all record types: the per-type differences
//! live entirely in the candidate-key tables in [`profiles`]. Each call is a
//! pure, single-pass, side-effect-free transform; malformed input degrades
//! to nulls and quality flags instead of failing.

pub mod fields;
pub mod profiles;
pub mod quality;

use serde_json::{Map, Value};

use crate::domain::{Location, ProviderMeta, RecordFragment, RecordType};
use crate::error::{IngestError, Result};
use profiles::TypeProfile;

/// Route a payload to the matching normalizer by declared record type.
///
/// An unknown type is the only error the pipeline produces; it carries the
/// offending value and the supported set, and never partially constructs a
/// fragment.
pub fn dispatch(record_type: &str, payload: &Value, provider_meta: &ProviderMeta) -> Result<RecordFragment> {
    let record_type = RecordType::parse(record_type).ok_or_else(|| IngestError::UnsupportedRecordType {
        record_type: record_type.to_string(),
        supported: RecordType::ALL.iter().map(|t| t.as_str()).collect(),
    })?;
    Ok(normalize(record_type, payload, provider_meta))
}

/// Normalize one payload into a canonical fragment.
pub fn normalize(record_type: RecordType, payload: &Value, provider_meta: &ProviderMeta) -> RecordFragment {
    let profile = profiles::profile_for(record_type);

    let severity = fields::normalize_severity(
        fields::probe(payload, profile.severity_keys)
            .map(|v| fields::stringify(v))
            .as_deref(),
    );
    // Time keys use the or-last chain: epoch 0 at the final candidate is a
    // valid instant, not a missing one.
    let event_time =
        fields::probe_or_last(payload, profile.time_keys).and_then(fields::parse_timestamp);
    let summary = fields::probe(payload, profile.summary_keys)
        .map(fields::safe_str)
        .unwrap_or_default();
    // An empty region becomes None, while an empty severity string still runs
    // through the severity table and lands on `unknown`. Providers rely on
    // this asymmetry, so it stays.
    let region = fields::probe(payload, profile.region_keys)
        .map(fields::safe_str)
        .filter(|r| !r.is_empty());

    let (metrics, metric_flags) = build_metrics(payload, profile);

    let mut fragment = RecordFragment {
        provider_id: provider_meta.provider_id.trim().to_string(),
        provider_name: provider_meta.provider_name.trim().to_string(),
        record_type,
        region,
        location: build_location(payload),
        event_time,
        severity,
        metrics,
        summary,
        quality_flags: Vec::new(),
    };
    fragment.quality_flags = quality::merge_flags(quality::collect_flags(&fragment), metric_flags);
    fragment
}

/// Build the location block: coordinates via the shared extractor, name and
/// elevation from a nested `location`/`coordinates` object when present, else
/// from top-level keys. Elevation coercion failure yields None.
fn build_location(payload: &Value) -> Location {
    let (lat, lon) = fields::extract_coordinates(payload);

    let block = fields::probe(payload, &["location", "coordinates"]).and_then(Value::as_object);
    let mut name = block
        .and_then(|b| b.get("name"))
        .map(fields::safe_str)
        .filter(|n| !n.is_empty());
    let mut raw_elevation =
        block.and_then(|b| fields::probe_object_or_last(b, &["elevation_ft", "elevation"]));

    if name.is_none() {
        name = payload
            .get("location_name")
            .map(fields::safe_str)
            .filter(|n| !n.is_empty());
    }
    if raw_elevation.is_none() {
        raw_elevation = fields::probe_or_last(payload, &["elevation_ft", "elevation"]);
    }

    Location {
        name,
        lat,
        lon,
        elevation_ft: raw_elevation.and_then(fields::coerce_i64),
    }
}

/// Seed metrics from a nested `metrics` object, overlay the profile's
/// top-level metric keys (overlay wins on conflict), then validate.
fn build_metrics(payload: &Value, profile: &TypeProfile) -> (Map<String, Value>, Vec<String>) {
    let mut raw = payload
        .get("metrics")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    for key in profile.metric_overlay_keys {
        if let Some(value) = payload.get(*key) {
            if !value.is_null() {
                raw.insert((*key).to_string(), value.clone());
            }
        }
    }
    fields::validate_metrics(&raw)
}
