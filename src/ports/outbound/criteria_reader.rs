use crate::graph_query::domain::FilterCriteria;
use crate::shared::Result;
use std::path::Path;

/// CriteriaReader port for loading saved filter criteria
pub trait CriteriaReader {
    /// Reads a list of criteria from `path`
    ///
    /// # Errors
    /// Returns an error if the file cannot be read safely or does not
    /// contain a valid criteria list
    fn read_criteria(&self, path: &Path) -> Result<FilterCriteria>;
}
