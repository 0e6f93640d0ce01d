pub mod in_memory;

pub use in_memory::InMemoryStorage;

use async_trait::async_trait;

use crate::domain::StoredRecord;
use crate::error::Result;

/// Filters applied when listing persisted records. Filter values are plain
/// strings straight from the query boundary; an unrecognized value simply
/// matches nothing.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub provider_id: Option<String>,
    pub record_type: Option<String>,
    pub severity: Option<String>,
}

impl RecordFilter {
    pub fn matches(&self, record: &StoredRecord) -> bool {
        self.provider_id
            .as_deref()
            .map_or(true, |p| record.provider_id == p)
            && self
                .record_type
                .as_deref()
                .map_or(true, |t| record.record_type.as_str() == t)
            && self
                .severity
                .as_deref()
                .map_or(true, |s| record.severity.as_str() == s)
    }
}

/// Storage trait for persisting normalized records
#[async_trait]
pub trait Storage: Send + Sync {
    async fn insert_record(&self, record: &StoredRecord) -> Result<()>;
    async fn get_record(&self, record_id: &str) -> Result<Option<StoredRecord>>;
    /// Newest-first by ingestion time, bounded by `limit`.
    async fn list_records(&self, filter: &RecordFilter, limit: usize) -> Result<Vec<StoredRecord>>;
}
