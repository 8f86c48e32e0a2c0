//! Delimited call-log tables
//!
//! A `CallTable` is the header plus the raw cells of a delimited text file.
//! Empty cells are nulls. Quoting follows the usual spreadsheet convention:
//! a field starting with `"` runs to the next unpaired quote and `""` is a
//! literal quote, so fields may contain delimiters and newlines.

use crate::error::{AnalyzerError, Result};
use std::fs;
use std::path::Path;

/// In-memory table of call-log cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl CallTable {
    /// Create a table from a header and rows
    ///
    /// Rows shorter than the header are padded with nulls; longer rows are truncated.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();

        Self { columns, rows }
    }

    /// Convenience constructor from string slices, treating `""` as null
    pub fn from_strs(columns: &[&str], rows: &[&[&str]]) -> Self {
        let columns = columns.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|cell| non_empty(cell)).collect())
            .collect();

        Self::new(columns, rows)
    }

    /// Read and parse a delimited file
    pub fn from_path<P: AsRef<Path>>(path: P, delimiter: char) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| AnalyzerError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let table = Self::parse(&content, delimiter)?;
        tracing::info!(
            "Loaded {} rows x {} columns from {}",
            table.len(),
            table.columns.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parse delimited text whose first record is the header
    pub fn parse(content: &str, delimiter: char) -> Result<Self> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut records = split_records(content, delimiter)?.into_iter();

        let Some((_, header)) = records.next() else {
            return Ok(Self::default());
        };
        let columns: Vec<String> = header.iter().map(|c| c.trim().to_string()).collect();

        let mut rows = Vec::new();
        for (line, fields) in records {
            if fields.len() > columns.len() {
                return Err(AnalyzerError::Parse {
                    line,
                    message: format!(
                        "expected {} fields, found {}",
                        columns.len(),
                        fields.len()
                    ),
                });
            }
            rows.push(fields.iter().map(|f| non_empty(f)).collect());
        }

        Ok(Self::new(columns, rows))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Resolve column positions, failing with a schema error if any are absent
    pub fn require_columns(&self, fields: &[&str]) -> Result<Vec<usize>> {
        fields
            .iter()
            .map(|f| self.column_index(f))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| AnalyzerError::schema(fields, &self.columns))
    }

    /// Cell value, `None` when null
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }
}

fn non_empty(cell: &str) -> Option<String> {
    if cell.is_empty() {
        None
    } else {
        Some(cell.to_string())
    }
}

/// Split text into records of fields, tagging each with its starting line (1-based)
fn split_records(content: &str, delimiter: char) -> Result<Vec<(usize, Vec<String>)>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    current.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    current.push(c);
                }
                _ => current.push(c),
            }
            continue;
        }

        match c {
            '"' if current.is_empty() => in_quotes = true,
            c if c == delimiter => fields.push(std::mem::take(&mut current)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                fields.push(std::mem::take(&mut current));
                push_record(&mut records, record_line, std::mem::take(&mut fields));
                line += 1;
                record_line = line;
            }
            _ => current.push(c),
        }
    }

    if in_quotes {
        return Err(AnalyzerError::Parse {
            line: record_line,
            message: "unterminated quoted field".to_string(),
        });
    }

    if !current.is_empty() || !fields.is_empty() {
        fields.push(current);
        push_record(&mut records, record_line, fields);
    }

    Ok(records)
}

fn push_record(records: &mut Vec<(usize, Vec<String>)>, line: usize, fields: Vec<String>) {
    // blank line
    if fields.len() == 1 && fields[0].trim().is_empty() {
        return;
    }
    records.push((line, fields));
}
