use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Graph fetched (or query printed) successfully
    Success = 0,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (query endpoint, network, config, file I/O, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Errors raised while querying and shaping the asset graph.
///
/// `Normalization` and `Classification` are collected as per-row
/// diagnostics and reported as warnings; they never fail a fetch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("Failed to compile query: {reason}")]
    CompileError { reason: String },

    #[error("Query execution failed{}: {message}\n\n💡 Hint: Please verify the --endpoint URL and that the graph store is reachable", status_suffix(.status))]
    QueryExecution { status: Option<u16>, message: String },

    #[error("Skipped result row: {reason}")]
    Normalization { reason: String },

    #[error("Could not decode property '{property}' on node {node_id}: {reason}")]
    Classification {
        node_id: String,
        property: String,
        reason: String,
    },

    #[error("Invalid filter criterion: {reason}\n\n💡 Hint: A criterion can be bidirectional or full-graph, not both")]
    InvalidCriteria { reason: String },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileRead { path: PathBuf, details: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWrite { path: PathBuf, details: String },

    /// Validation error for reducers and builders
    #[error("Validation error: {message}")]
    Validation { message: String },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}
