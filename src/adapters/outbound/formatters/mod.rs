/// Formatter adapters for the supported graph output formats
mod json_graph_formatter;
mod markdown_summary_formatter;

pub use json_graph_formatter::JsonGraphFormatter;
pub use markdown_summary_formatter::MarkdownSummaryFormatter;
