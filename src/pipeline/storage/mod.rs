// Pipeline storage: in-memory, content-addressed memoization

pub mod content_cache;

pub use content_cache::ContentSlot;
