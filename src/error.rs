use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProspectError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Could not decode reference file with any of: {tried}")]
    Encoding { tried: String },

    #[error("Part {part} skipped: {reason}")]
    PartSkipped { part: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, ProspectError>;
