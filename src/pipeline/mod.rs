// Data processing pipeline: ingestion, processing, and storage

pub mod ingestion;
pub mod orchestrator;
pub mod processing;
pub mod storage;

// Re-export the entry points used by the binary and embedders
pub use orchestrator::{IngestOutcome, MasterDataset, PartInput, Pipeline, SkippedPart};
