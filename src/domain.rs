use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// The fixed set of record types the pipeline can normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Bulletin,
    Observation,
    Weather,
}

impl RecordType {
    pub const ALL: [RecordType; 3] = [
        RecordType::Bulletin,
        RecordType::Observation,
        RecordType::Weather,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "bulletin" => Some(Self::Bulletin),
            "observation" => Some(Self::Observation),
            "weather" => Some(Self::Weather),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bulletin => "bulletin",
            Self::Observation => "observation",
            Self::Weather => "weather",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical five-point hazard scale plus `unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Moderate,
    Considerable,
    High,
    Extreme,
    Unknown,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::Considerable => "considerable",
            Self::High => "high",
            Self::Extreme => "extreme",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied provider identity. Never derived from payload content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMeta {
    pub provider_id: String,
    pub provider_name: String,
}

/// Geographic context extracted from a payload. Every field is optional;
/// partial results are expected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub elevation_ft: Option<i64>,
}

/// Normalizer output prior to persistence-assigned fields. Immutable once
/// built; identity (`record_id`, `ingested_at`) is assigned by the request
/// boundary when the fragment is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordFragment {
    pub provider_id: String,
    pub provider_name: String,
    pub record_type: RecordType,
    pub region: Option<String>,
    pub location: Location,
    pub event_time: Option<String>,
    pub severity: Severity,
    pub metrics: Map<String, Value>,
    pub summary: String,
    pub quality_flags: Vec<String>,
}

/// A persisted record: the fragment plus boundary-assigned identity and the
/// original payload retained verbatim for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub record_id: String,
    pub provider_id: String,
    pub provider_name: String,
    pub record_type: RecordType,
    pub region: Option<String>,
    pub location: Location,
    pub event_time: Option<String>,
    pub ingested_at: String,
    pub severity: Severity,
    pub metrics: Map<String, Value>,
    pub summary: String,
    pub raw_payload: Value,
    pub quality_flags: Vec<String>,
}

impl StoredRecord {
    /// Assign a fresh record id and ingestion timestamp. The raw payload is
    /// stored exactly as submitted, regardless of normalization outcome.
    pub fn from_fragment(fragment: RecordFragment, raw_payload: Value) -> Self {
        Self {
            record_id: Uuid::new_v4().to_string(),
            provider_id: fragment.provider_id,
            provider_name: fragment.provider_name,
            record_type: fragment.record_type,
            region: fragment.region,
            location: fragment.location,
            event_time: fragment.event_time,
            ingested_at: Utc::now().to_rfc3339(),
            severity: fragment.severity,
            metrics: fragment.metrics,
            summary: fragment.summary,
            raw_payload,
            quality_flags: fragment.quality_flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_type_parse_roundtrip() {
        for record_type in RecordType::ALL {
            assert_eq!(RecordType::parse(record_type.as_str()), Some(record_type));
        }
        assert_eq!(RecordType::parse("forecast"), None);
        assert_eq!(RecordType::parse("Bulletin"), None);
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Severity::Considerable).unwrap(), json!("considerable"));
        assert_eq!(serde_json::to_value(Severity::Unknown).unwrap(), json!("unknown"));
    }

    #[test]
    fn stored_record_keeps_raw_payload_verbatim() {
        let fragment = RecordFragment {
            provider_id: "p1".into(),
            provider_name: "Provider".into(),
            record_type: RecordType::Bulletin,
            region: None,
            location: Location::default(),
            event_time: None,
            severity: Severity::Unknown,
            metrics: Map::new(),
            summary: String::new(),
            quality_flags: vec![],
        };
        let raw = json!({"danger": "3", "weird_field": [1, 2, 3]});
        let record = StoredRecord::from_fragment(fragment, raw.clone());
        assert_eq!(record.raw_payload, raw);
        assert!(!record.record_id.is_empty());
        assert!(record.ingested_at.contains('T'));
    }
}
