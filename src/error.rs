use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    /// The only client-input error the core can produce. Never transient,
    /// never retried.
    #[error("Unsupported record_type: '{record_type}'. Supported: {supported:?}")]
    UnsupportedRecordType {
        record_type: String,
        supported: Vec<&'static str>,
    },

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, IngestError>;
