use crate::adapters::outbound::formatters::{JsonGraphFormatter, MarkdownSummaryFormatter};
use crate::application::dto::OutputFormat;
use crate::ports::outbound::GraphFormatter;

/// Factory for creating graph formatters
///
/// Maps an [`OutputFormat`] chosen on the command line or in the config
/// file to the formatter adapter that renders it.
pub struct FormatterFactory;

impl FormatterFactory {
    /// Creates a formatter instance for the specified output format
    ///
    /// # Examples
    /// ```
    /// use asset_graph::application::dto::OutputFormat;
    /// use asset_graph::application::factories::FormatterFactory;
    ///
    /// let formatter = FormatterFactory::create(OutputFormat::Json);
    /// ```
    pub fn create(format: OutputFormat) -> Box<dyn GraphFormatter> {
        match format {
            OutputFormat::Json => Box::new(JsonGraphFormatter::new()),
            OutputFormat::Markdown => Box::new(MarkdownSummaryFormatter::new()),
        }
    }

    /// Returns the progress message for the specified output format
    ///
    /// # Examples
    /// ```
    /// use asset_graph::application::dto::OutputFormat;
    /// use asset_graph::application::factories::FormatterFactory;
    ///
    /// let message = FormatterFactory::progress_message(OutputFormat::Json);
    /// assert_eq!(message, "📝 Rendering graph as JSON...");
    /// ```
    pub fn progress_message(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Json => "📝 Rendering graph as JSON...",
            OutputFormat::Markdown => "📝 Rendering Markdown summary...",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::{GraphResponse, GraphSnapshot};

    #[test]
    fn test_create_json_formatter() {
        let formatter = FormatterFactory::create(OutputFormat::Json);
        let output = formatter
            .format(&GraphResponse::new(GraphSnapshot::empty(25, 0)))
            .unwrap();
        assert!(output.trim_start().starts_with('{'));
    }

    #[test]
    fn test_create_markdown_formatter() {
        let formatter = FormatterFactory::create(OutputFormat::Markdown);
        let output = formatter
            .format(&GraphResponse::new(GraphSnapshot::empty(25, 0)))
            .unwrap();
        assert!(output.starts_with("# Asset Graph Summary"));
    }

    #[test]
    fn test_progress_messages() {
        assert_eq!(
            FormatterFactory::progress_message(OutputFormat::Json),
            "📝 Rendering graph as JSON..."
        );
        assert_eq!(
            FormatterFactory::progress_message(OutputFormat::Markdown),
            "📝 Rendering Markdown summary..."
        );
    }
}
