// Pipeline processing: normalization, merging, enrichment, filtering

pub mod columns;
pub mod enrich;
pub mod filter;
pub mod merge;
pub mod normalize;
pub mod summary;

pub use columns::ColumnPresence;
pub use enrich::{Enricher, MetricsEnricher, ReliabilityBand};
pub use filter::{FilterEngine, FilterSpec, SearchField};
pub use merge::{MasterMerger, MergeOutcome};
pub use normalize::{Normalizer, SchemaMapper};
pub use summary::{distinct_provinces, DatasetSummary};
