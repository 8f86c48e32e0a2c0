//! Analyzer configuration: input location and column names
//!
//! The configuration is an explicit value handed to every operation.
//! Field names are configurable because historical exports spell the
//! receiver column `reciever`.

use crate::error::{AnalyzerError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CALLER_FIELD: &str = "caller";
pub const DEFAULT_RECEIVER_FIELD: &str = "receiver";
pub const DEFAULT_TIMESTAMP_FIELD: &str = "timestamp";

/// Configuration for reading and transforming a call log
///
/// # Example
/// ```
/// use rellamar::config::AnalyzerConfig;
///
/// let config = AnalyzerConfig::default();
/// assert_eq!(config.receiver_field, "receiver");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Path of the delimited call log
    pub csv_file: Option<PathBuf>,

    /// Column holding the call originator
    pub caller_field: String,

    /// Column holding the call recipient
    pub receiver_field: String,

    /// Column holding the call date-time
    pub timestamp_field: String,

    /// Single-byte field delimiter
    pub delimiter: char,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            csv_file: None,
            caller_field: DEFAULT_CALLER_FIELD.to_string(),
            receiver_field: DEFAULT_RECEIVER_FIELD.to_string(),
            timestamp_field: DEFAULT_TIMESTAMP_FIELD.to_string(),
            delimiter: ',',
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a TOML file
    ///
    /// Keys left out of the file keep their defaults.
    ///
    /// # Example TOML
    /// ```toml
    /// csv_file = "data/calls.csv"
    /// receiver_field = "reciever"
    /// ```
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| AnalyzerError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AnalyzerError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field names and delimiter
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("caller_field", &self.caller_field),
            ("receiver_field", &self.receiver_field),
            ("timestamp_field", &self.timestamp_field),
        ];

        for (key, value) in &fields {
            if value.trim().is_empty() {
                return Err(AnalyzerError::Config(format!("{} must not be empty", key)));
            }
        }

        for (i, (key_a, a)) in fields.iter().enumerate() {
            for (key_b, b) in &fields[i + 1..] {
                if a == b {
                    return Err(AnalyzerError::Config(format!(
                        "{} and {} must name different columns, both are '{}'",
                        key_a, key_b, a
                    )));
                }
            }
        }

        if !self.delimiter.is_ascii() || matches!(self.delimiter, '"' | '\n' | '\r') {
            return Err(AnalyzerError::Config(format!(
                "delimiter must be a single ASCII character other than quote or newline, got {:?}",
                self.delimiter
            )));
        }

        Ok(())
    }

    /// Field names as (caller, receiver, timestamp)
    pub fn fields(&self) -> (&str, &str, &str) {
        (
            &self.caller_field,
            &self.receiver_field,
            &self.timestamp_field,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.caller_field, "caller");
        assert_eq!(config.receiver_field, "receiver");
        assert_eq!(config.timestamp_field, "timestamp");
        assert_eq!(config.delimiter, ',');
        assert!(config.csv_file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_partial_keeps_defaults() {
        let config = AnalyzerConfig::from_toml_str(
            r#"
            csv_file = "calls.csv"
            receiver_field = "reciever"
            "#,
        )
        .unwrap();

        assert_eq!(config.csv_file, Some(PathBuf::from("calls.csv")));
        assert_eq!(config.receiver_field, "reciever");
        assert_eq!(config.caller_field, "caller");
    }

    #[test]
    fn test_toml_semicolon_delimiter() {
        let config = AnalyzerConfig::from_toml_str(r#"delimiter = ";""#).unwrap();
        assert_eq!(config.delimiter, ';');
    }

    #[test]
    fn test_toml_syntax_error() {
        let result = AnalyzerConfig::from_toml_str("csv_file = ");
        assert!(matches!(result, Err(AnalyzerError::Config(_))));
    }

    #[test]
    fn test_empty_field_rejected() {
        let config = AnalyzerConfig {
            caller_field: "  ".to_string(),
            ..AnalyzerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let config = AnalyzerConfig {
            receiver_field: "caller".to_string(),
            ..AnalyzerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("caller_field and receiver_field"));
    }

    #[test]
    fn test_quote_delimiter_rejected() {
        let config = AnalyzerConfig {
            delimiter: '"',
            ..AnalyzerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = AnalyzerConfig::from_toml("/nonexistent/rellamar.toml");
        assert!(matches!(result, Err(AnalyzerError::Io { .. })));
    }
}
