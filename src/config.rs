//! Configuration file support for asset-graph.
//!
//! Provides YAML-based configuration through `asset-graph.config.yml` files,
//! including data structures, file loading, and validation.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::application::dto::OutputFormat;
use crate::graph_query::domain::FilterCriteria;
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "asset-graph.config.yml";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub show_internet: Option<bool>,
    pub viewport_width: Option<f64>,
    pub format: Option<OutputFormat>,
    /// Saved criteria, same shape as a `--criteria` file.
    pub filters: Option<FilterCriteria>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: BTreeMap<String, serde_yaml_ng::Value>,
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML and each filter sets at most one of bidirectional/fullGraph.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    load_config_from_path(&config_path).map(Some)
}

/// Validate the loaded configuration.
pub fn validate_config(config: &ConfigFile) -> Result<()> {
    if let Some(endpoint) = config.endpoint.as_deref() {
        let endpoint = endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            bail!(
                "Invalid config: endpoint '{}' is not an http(s) URL.\n\n\
                 💡 Hint: Use the full query URL, e.g. \"http://localhost:5000/neo4j/query\".",
                endpoint
            );
        }
    }

    if config.timeout_seconds == Some(0) {
        bail!(
            "Invalid config: timeout_seconds must be greater than 0.\n\n\
             💡 Hint: Remove the field to use the default of 30 seconds."
        );
    }

    if let Some(width) = config.viewport_width {
        if !width.is_finite() || width <= 0.0 {
            bail!(
                "Invalid config: viewport_width must be a positive number, got {}.",
                width
            );
        }
    }

    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        eprintln!(
            "⚠️  Warning: Unknown config field '{}' will be ignored.",
            key
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_query::domain::QueryMode;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_valid_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(
            &config_path,
            r#"
endpoint: http://localhost:5000/neo4j/query
token: secret
timeout_seconds: 10
show_internet: true
viewport_width: 1440
format: markdown
filters:
  - sourceType: aws_ec2_instance
    relationship: has_vulnerability
    targetType: vulnerability
    severity: high
  - sourceType: aws_vpc
    fullGraph: true
"#,
        )
        .unwrap();

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(
            config.endpoint.as_deref(),
            Some("http://localhost:5000/neo4j/query")
        );
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.timeout_seconds, Some(10));
        assert_eq!(config.show_internet, Some(true));
        assert_eq!(config.viewport_width, Some(1440.0));
        assert_eq!(config.format, Some(OutputFormat::Markdown));

        let filters = config.filters.unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(
            filters.get(0).unwrap().filters.severity.as_deref(),
            Some("high")
        );
        assert_eq!(filters.get(1).unwrap().mode, QueryMode::FullGraph);
        assert!(config.unknown_fields.is_empty());
    }

    #[test]
    fn test_discover_config_found() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "format: json\n").unwrap();

        let config = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_discover_config_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(discover_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config_from_path(Path::new("/nonexistent/config.yml"));
        let err = format!("{}", result.unwrap_err());
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_load_config_parse_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("bad.yml");
        fs::write(&config_path, "invalid: yaml: [[[broken").unwrap();

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_conflicting_filter_modes_rejected() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(
            &config_path,
            "filters:\n  - sourceType: aws_vpc\n    bidirectional: true\n    fullGraph: true\n",
        )
        .unwrap();

        assert!(load_config_from_path(&config_path).is_err());
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let config = ConfigFile {
            endpoint: Some("ftp://graph.local".to_string()),
            ..ConfigFile::default()
        };
        let err = format!("{}", validate_config(&config).unwrap_err());
        assert!(err.contains("not an http(s) URL"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = ConfigFile {
            timeout_seconds: Some(0),
            ..ConfigFile::default()
        };
        let err = format!("{}", validate_config(&config).unwrap_err());
        assert!(err.contains("timeout_seconds"));
    }

    #[test]
    fn test_non_positive_viewport_rejected() {
        let config = ConfigFile {
            viewport_width: Some(-5.0),
            ..ConfigFile::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_unknown_fields_captured() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(
            &config_path,
            "format: json\nneo4j_password: hunter2\nlayout_mode: radial\n",
        )
        .unwrap();

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(config.unknown_fields.len(), 2);
        assert!(config.unknown_fields.contains_key("neo4j_password"));
        assert!(config.unknown_fields.contains_key("layout_mode"));
    }

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();
        assert!(config.endpoint.is_none());
        assert!(config.filters.is_none());
        assert!(config.format.is_none());
        assert!(config.unknown_fields.is_empty());
    }
}
