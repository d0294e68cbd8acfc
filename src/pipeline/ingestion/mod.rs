// Pipeline ingestion: workbook decoding and per-part sheet assembly

pub mod assembler;
pub mod workbook;

pub use assembler::{AssembledPart, PartAssembler};
pub use workbook::{CalamineReader, PartReader};
