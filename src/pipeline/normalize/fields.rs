//! Pure field-extraction and coercion helpers shared by all normalizers.
//!
//! Every function here degrades gracefully: malformed input yields `None`,
//! an empty string or `Severity::Unknown`, never an error.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat};
use serde_json::{Map, Value};

use super::quality::INVALID_METRIC_TYPE;
use crate::domain::Severity;

/// Fixed severity lookup table. Inputs are matched after trimming and
/// lowercasing; anything outside the table maps to `unknown`.
pub const SEVERITY_TABLE: &[(&str, Severity)] = &[
    ("1", Severity::Low),
    ("2", Severity::Moderate),
    ("3", Severity::Considerable),
    ("4", Severity::High),
    ("5", Severity::Extreme),
    ("low", Severity::Low),
    ("moderate", Severity::Moderate),
    ("considerable", Severity::Considerable),
    ("high", Severity::High),
    ("extreme", Severity::Extreme),
    ("no rating", Severity::Unknown),
    ("none", Severity::Unknown),
];

/// Timestamp formats tried in order; the first full match wins.
pub const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d",
];

/// Providers routinely send empty strings, zeroes and empty containers where
/// they mean "absent", so candidate-key probing skips them.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// First truthy value among an ordered candidate key list.
pub fn probe<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    value.as_object().and_then(|obj| probe_object(obj, keys))
}

/// Same as [`probe`] over an already-unwrapped object.
pub fn probe_object<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|k| obj.get(*k)).find(|v| truthy(v))
}

/// Like [`probe`], but a falsy value sitting at the last candidate key still
/// wins: a zero or empty string there is data, not absence. Used for the
/// coordinate, elevation and timestamp chains, where `0` is meaningful.
pub fn probe_or_last<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    value.as_object().and_then(|obj| probe_object_or_last(obj, keys))
}

/// Same as [`probe_or_last`] over an already-unwrapped object.
pub fn probe_object_or_last<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    let mut last = None;
    for key in keys {
        match obj.get(*key) {
            Some(value) if truthy(value) => return Some(value),
            Some(value) if !value.is_null() => last = Some(value),
            _ => last = None,
        }
    }
    last
}

/// Render a raw value as the string the severity table expects: strings pass
/// through, anything else uses its JSON rendering.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Null becomes the empty string; everything else is stringified and trimmed.
pub fn safe_str(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// Coerce a scalar to a floating-point number.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Coerce a scalar to an integer. Floats truncate toward zero; strings must
/// be plain integers.
pub fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(*b as i64),
        _ => None,
    }
}

/// Extract `(lat, lon)` from top-level `lat`/`latitude` and `lon`/`longitude`
/// keys, falling back to a nested `location` or `coordinates` object only
/// when both top-level chains resolve to nothing at all. A present-but-empty
/// value still suppresses the fallback; a falsy last candidate (zero
/// latitude) is kept. Each side is coerced independently, so partial results
/// are possible.
pub fn extract_coordinates(payload: &Value) -> (Option<f64>, Option<f64>) {
    let mut lat = probe_or_last(payload, &["lat", "latitude"]);
    let mut lon = probe_or_last(payload, &["lon", "longitude"]);
    if lat.is_none() && lon.is_none() {
        if let Some(block) = probe(payload, &["location", "coordinates"]).and_then(Value::as_object)
        {
            lat = probe_object_or_last(block, &["lat", "latitude"]);
            lon = probe_object_or_last(block, &["lon", "longitude"]);
        }
    }
    (lat.and_then(coerce_f64), lon.and_then(coerce_f64))
}

/// Map a raw severity string onto the canonical scale.
pub fn normalize_severity(value: Option<&str>) -> Severity {
    let Some(value) = value else {
        return Severity::Unknown;
    };
    let needle = value.trim().to_lowercase();
    SEVERITY_TABLE
        .iter()
        .find(|(key, _)| *key == needle)
        .map(|(_, severity)| *severity)
        .unwrap_or(Severity::Unknown)
}

// Epoch bounds for years 0001-01-01 through 9999-12-31.
const MIN_EPOCH_SECS: f64 = -62_135_596_800.0;
const MAX_EPOCH_SECS: f64 = 253_402_300_800.0;

/// Parse a raw timestamp value into an ISO-8601 string with an explicit UTC
/// offset. Numbers are UTC epoch seconds (fractional allowed, years 1-9999
/// only); strings are tried against [`TIMESTAMP_FORMATS`] in order, assuming
/// UTC when no timezone is present. Anything else yields `None`.
pub fn parse_timestamp(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            let secs = n.as_f64()?;
            if !secs.is_finite() || secs < MIN_EPOCH_SECS || secs >= MAX_EPOCH_SECS {
                return None;
            }
            DateTime::from_timestamp_micros((secs * 1_000_000.0) as i64)
                .map(|dt| format_timestamp(dt.fixed_offset()))
        }
        Value::String(s) => {
            let trimmed = s.trim();
            TIMESTAMP_FORMATS
                .iter()
                .find_map(|format| parse_with_format(trimmed, format))
                .map(format_timestamp)
        }
        _ => None,
    }
}

// Seconds precision, widened to six fractional digits when a sub-second
// component is present.
fn format_timestamp(dt: DateTime<FixedOffset>) -> String {
    let precision = if dt.timestamp_subsec_micros() == 0 {
        SecondsFormat::Secs
    } else {
        SecondsFormat::Micros
    };
    dt.to_rfc3339_opts(precision, false)
}

fn parse_with_format(input: &str, format: &str) -> Option<DateTime<FixedOffset>> {
    if format.contains("%z") {
        DateTime::parse_from_str(input, format).ok()
    } else if format.contains("%H") {
        NaiveDateTime::parse_from_str(input, format)
            .ok()
            .map(|dt| dt.and_utc().fixed_offset())
    } else {
        NaiveDate::parse_from_str(input, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().fixed_offset())
    }
}

/// Drop non-scalar metric values, flagging each dropped entry. Accepted
/// scalars (string, number, boolean, null) pass through unchanged; the flag
/// list is deduplicated downstream.
pub fn validate_metrics(metrics: &Map<String, Value>) -> (Map<String, Value>, Vec<String>) {
    let mut cleaned = Map::new();
    let mut flags = Vec::new();
    for (key, value) in metrics {
        match value {
            Value::Array(_) | Value::Object(_) => flags.push(INVALID_METRIC_TYPE.to_string()),
            scalar => {
                cleaned.insert(key.clone(), scalar.clone());
            }
        }
    }
    (cleaned, flags)
}
