//! Ingest tasks shared by the HTTP boundary and the CLI, plus their
//! request/response shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::domain::{ProviderMeta, StoredRecord};
use crate::error::Result;
use crate::pipeline::normalize;
use crate::pipeline::storage::Storage;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    pub provider_id: String,
    pub provider_name: String,
    pub record_type: String,
    pub payload: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    pub record: StoredRecord,
    pub quality_flags: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchIngestRequest {
    pub records: Vec<IngestRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchRecordResult {
    pub success: bool,
    pub record: Option<StoredRecord>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchIngestResponse {
    pub total_count: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub results: Vec<BatchRecordResult>,
}

/// Normalize one request, assign identity and ingestion time, and persist it
/// together with the verbatim raw payload.
pub async fn ingest_record(storage: &dyn Storage, request: &IngestRequest) -> Result<StoredRecord> {
    let provider_meta = ProviderMeta {
        provider_id: request.provider_id.clone(),
        provider_name: request.provider_name.clone(),
    };
    let fragment = normalize::dispatch(&request.record_type, &request.payload, &provider_meta)?;

    if !fragment.quality_flags.is_empty() {
        warn!(
            provider_id = %provider_meta.provider_id,
            flags = ?fragment.quality_flags,
            "record ingested with quality flags"
        );
    }
    crate::metrics::record_quality_flags(fragment.quality_flags.len());

    let record = StoredRecord::from_fragment(fragment, request.payload.clone());
    storage.insert_record(&record).await?;
    crate::metrics::record_ingest_success(record.record_type.as_str());
    info!(record_id = %record.record_id, record_type = %record.record_type, "ingested record");
    Ok(record)
}

/// Batch ingestion with per-item error isolation: one bad item never aborts
/// its siblings, and results preserve input order.
pub async fn ingest_batch(storage: &dyn Storage, request: &BatchIngestRequest) -> BatchIngestResponse {
    let mut results = Vec::with_capacity(request.records.len());
    let mut success_count = 0;
    for item in &request.records {
        match ingest_record(storage, item).await {
            Ok(record) => {
                success_count += 1;
                results.push(BatchRecordResult {
                    success: true,
                    record: Some(record),
                    error: None,
                });
            }
            Err(e) => {
                crate::metrics::record_ingest_rejected();
                results.push(BatchRecordResult {
                    success: false,
                    record: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }
    BatchIngestResponse {
        total_count: request.records.len(),
        success_count,
        failed_count: request.records.len() - success_count,
        results,
    }
}

/// One human-readable line summarizing a stored record for the context view.
pub fn context_line(record: &StoredRecord) -> String {
    let coords = match (record.location.lat, record.location.lon) {
        (Some(lat), Some(lon)) => format!("{},{}", lat, lon),
        _ => "unknown".to_string(),
    };
    let summary = if record.summary.is_empty() {
        "(no summary)".to_string()
    } else {
        record.summary.chars().take(120).collect()
    };
    format!(
        "[{}] {} | {} | severity={} | coords={} | event_time={} | {}",
        record.record_type,
        record.provider_name,
        record.region.as_deref().unwrap_or("unknown region"),
        record.severity,
        coords,
        record.event_time.as_deref().unwrap_or("unknown"),
        summary,
    )
}
