use crate::graph_query::domain::FilterCriteria;
use crate::ports::outbound::CriteriaReader;
use crate::shared::error::GraphError;
use crate::shared::security::read_input_file;
use crate::shared::Result;
use std::path::Path;

/// FileSystemCriteriaReader adapter for criteria files
///
/// `.json` files are parsed as JSON; anything else as YAML. Both hold a
/// list of criteria in the camelCase shape
/// (`sourceType`, `relationship`, `targetType`, `severity`, ...).
pub struct FileSystemCriteriaReader;

impl FileSystemCriteriaReader {
    pub fn new() -> Self {
        Self
    }

    fn parse(path: &Path, content: &str) -> std::result::Result<FilterCriteria, String> {
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(content).map_err(|e| e.to_string())
        } else {
            serde_yaml_ng::from_str(content).map_err(|e| e.to_string())
        }
    }
}

impl Default for FileSystemCriteriaReader {
    fn default() -> Self {
        Self::new()
    }
}

impl CriteriaReader for FileSystemCriteriaReader {
    fn read_criteria(&self, path: &Path) -> Result<FilterCriteria> {
        let content = read_input_file(path, "criteria file").map_err(|e| GraphError::FileRead {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

        let criteria = Self::parse(path, &content).map_err(|details| GraphError::FileRead {
            path: path.to_path_buf(),
            details: format!("Invalid criteria list: {}", details),
        })?;

        Ok(criteria)
    }
}
