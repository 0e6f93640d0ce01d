use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;

use super::{RecordFilter, Storage};
use crate::domain::StoredRecord;
use crate::error::Result;

/// In-memory storage implementation for development/testing
pub struct InMemoryStorage {
    records: Arc<Mutex<HashMap<String, StoredRecord>>>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn insert_record(&self, record: &StoredRecord) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        records.insert(record.record_id.clone(), record.clone());

        debug!("Stored {} record with id {}", record.record_type, record.record_id);
        Ok(())
    }

    async fn get_record(&self, record_id: &str) -> Result<Option<StoredRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records.get(record_id).cloned())
    }

    async fn list_records(&self, filter: &RecordFilter, limit: usize) -> Result<Vec<StoredRecord>> {
        let records = self.records.lock().unwrap();
        let mut matched: Vec<StoredRecord> = records
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.ingested_at.cmp(&a.ingested_at));
        matched.truncate(limit);
        Ok(matched)
    }
}
