pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod idempotency;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod types;

// Postal-code geography shared by merge and enrichment
pub mod geo;

// Domain data shapes shared across layers
pub mod domain;
