// Ingestion pipeline: normalization, storage, and the tasks gluing them together

pub mod normalize;
pub mod storage;
pub mod tasks;
