use clap::ValueEnum;
use serde::Deserialize;

/// Output format of a fetched graph
///
/// Shared by the CLI (`--format`), the config file (`format:`) and the
/// formatter factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Graph model JSON for renderers (default)
    #[default]
    Json,
    /// Human-readable Markdown summary
    #[serde(alias = "md")]
    #[value(alias = "md")]
    Markdown,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}
