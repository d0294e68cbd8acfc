use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ProspectError, Result};
use crate::pipeline::processing::enrich::ReliabilityBand;
use crate::pipeline::processing::filter::SearchField;
use crate::pipeline::processing::normalize::{default_mappings, FieldMapping};

/// Runtime configuration, read from `config.toml`. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reliability: ReliabilityBand,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
    pub schema: SchemaConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Record fields matched by the free-text search
    pub fields: Vec<SearchField>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fields: SearchField::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Replaces the built-in DigiMV column table when present
    pub mappings: Option<Vec<FieldMapping>>,
}

impl SchemaConfig {
    pub fn effective_mappings(&self) -> Vec<FieldMapping> {
        self.mappings.clone().unwrap_or_else(default_mappings)
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            ProspectError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let band = &self.reliability;
        if !band.min.is_finite() || !band.max.is_finite() || band.min > band.max {
            return Err(ProspectError::Config(format!(
                "reliability band [{}, {}] is not a valid range",
                band.min, band.max
            )));
        }
        if self.search.fields.is_empty() {
            return Err(ProspectError::Config(
                "search.fields must name at least one field".to_string(),
            ));
        }
        if let Some(mappings) = &self.schema.mappings {
            for mapping in mappings {
                mapping.validate().map_err(ProspectError::Config)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.reliability, ReliabilityBand::default());
        assert_eq!(config.search.fields, SearchField::ALL.to_vec());
        assert_eq!(config.logging.directory, PathBuf::from("logs"));
        assert_eq!(config.schema.effective_mappings(), default_mappings());
    }

    #[test]
    fn test_partial_config_overrides() {
        let config = Config::from_toml(
            r#"
            [reliability]
            min_revenue_per_fte = 25000
            max_revenue_per_fte = 90000

            [search]
            fields = ["name", "code"]
            "#,
        )
        .unwrap();
        assert_eq!(config.reliability.min, 25_000.0);
        assert_eq!(config.reliability.max, 90_000.0);
        assert_eq!(config.search.fields, vec![SearchField::Name, SearchField::Code]);
    }

    #[test]
    fn test_inverted_band_is_rejected() {
        let result = Config::from_toml(
            r#"
            [reliability]
            min_revenue_per_fte = 100000
            max_revenue_per_fte = 20000
            "#,
        );
        assert!(matches!(result, Err(ProspectError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[[schema.mappings]]\nfield = \"name\"\nsheet = \"RowData_01\"\ncolumn = \"Naam\""
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        let mappings = config.schema.effective_mappings();
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].column, "Naam");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = Config::load(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ProspectError::Config(_))));
    }
}
