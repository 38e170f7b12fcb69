use crate::application::dto::GraphResponse;
use crate::shared::Result;

/// GraphFormatter port for rendering a fetched graph
///
/// This port abstracts the output format (JSON graph model, Markdown summary).
pub trait GraphFormatter {
    /// Formats the response of one fetch cycle
    ///
    /// # Errors
    /// Returns an error if serialization fails
    fn format(&self, response: &GraphResponse) -> Result<String>;
}
