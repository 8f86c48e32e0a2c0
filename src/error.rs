//! Error types for table loading, record extraction and graph construction

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading call tables or building analysis outputs
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// A call record is missing a required value or its timestamp is unparseable.
    /// `row` is the 1-based data row (header excluded).
    #[error("Invalid input at row {row}: {message}")]
    InvalidInput { row: usize, message: String },

    /// Requested fields are absent from the table schema
    #[error("Table must contain columns {required:?} (missing: {missing:?})")]
    Schema {
        missing: Vec<String>,
        required: Vec<String>,
    },

    /// Delimited text could not be split into fields
    #[error("Malformed table at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Graph construction failed: {0}")]
    Graph(String),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;

impl AnalyzerError {
    /// Build a schema error from the required field list and the columns present
    pub fn schema(required: &[&str], columns: &[String]) -> Self {
        let mut required: Vec<String> = required.iter().map(|f| f.to_string()).collect();
        required.sort();
        required.dedup();

        let missing = required
            .iter()
            .filter(|f| !columns.iter().any(|c| c == *f))
            .cloned()
            .collect();

        AnalyzerError::Schema { missing, required }
    }
}
