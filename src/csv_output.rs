//! CSV output for the enriched call table and the dyad summary
//!
//! The enriched table keeps the input's columns in their original order and
//! appends `next_timestamp`, `duration` and `reconnected`.

use crate::record::EnrichedRecord;
use crate::stats::DyadSummary;
use crate::table::CallTable;
use crate::timestamp::format_timestamp;

/// Columns appended to every enriched row
pub const ENRICHED_COLUMNS: [&str; 3] = ["next_timestamp", "duration", "reconnected"];

/// Columns of the per-dyad summary
pub const STATS_COLUMNS: [&str; 9] = [
    "caller",
    "receiver",
    "calls",
    "reconnections",
    "censored",
    "mean_days",
    "median_days",
    "min_days",
    "max_days",
];

/// CSV row for a single enriched call
#[derive(Debug, Clone)]
pub struct CsvEnrichedRow {
    /// Values of the base columns, `None` for nulls
    pub values: Vec<Option<String>>,
    pub next_timestamp: Option<String>,
    pub duration: f64,
    pub reconnected: bool,
}

/// CSV output formatter for transformer results
#[derive(Debug)]
pub struct CsvOutput {
    columns: Vec<String>,
    rows: Vec<CsvEnrichedRow>,
    delimiter: char,
}

impl CsvOutput {
    /// Create a formatter for the given base columns
    pub fn new(columns: Vec<String>, delimiter: char) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            delimiter,
        }
    }

    /// Formatter carrying the source table's columns and cell values
    pub fn from_table(table: &CallTable, records: &[EnrichedRecord], delimiter: char) -> Self {
        let mut output = Self::new(table.columns().to_vec(), delimiter);
        for record in records {
            let values = table
                .rows()
                .get(record.source_index)
                .cloned()
                .unwrap_or_default();
            output.add_row(Self::enriched_row(values, record));
        }
        output
    }

    /// Formatter for records that did not come from a table
    pub fn from_records(records: &[EnrichedRecord], delimiter: char) -> Self {
        let columns = ["caller", "receiver", "timestamp"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let mut output = Self::new(columns, delimiter);
        for record in records {
            let values = vec![
                Some(record.caller.clone()),
                Some(record.receiver.clone()),
                Some(format_timestamp(record.timestamp)),
            ];
            output.add_row(Self::enriched_row(values, record));
        }
        output
    }

    fn enriched_row(values: Vec<Option<String>>, record: &EnrichedRecord) -> CsvEnrichedRow {
        CsvEnrichedRow {
            values,
            next_timestamp: record.next_timestamp.map(format_timestamp),
            duration: record.duration,
            reconnected: record.reconnected,
        }
    }

    pub fn add_row(&mut self, row: CsvEnrichedRow) {
        self.rows.push(row);
    }

    /// Header row: base columns then the enrichment columns
    fn header(&self) -> String {
        let sep = self.delimiter.to_string();
        self.columns
            .iter()
            .map(|c| escape_field(c, self.delimiter))
            .chain(ENRICHED_COLUMNS.iter().map(|c| c.to_string()))
            .collect::<Vec<_>>()
            .join(&sep)
    }

    fn format_row(&self, row: &CsvEnrichedRow) -> String {
        let mut fields: Vec<String> = (0..self.columns.len())
            .map(|i| {
                row.values
                    .get(i)
                    .and_then(|v| v.as_deref())
                    .map(|v| escape_field(v, self.delimiter))
                    .unwrap_or_default()
            })
            .collect();

        fields.push(row.next_timestamp.clone().unwrap_or_default());
        fields.push(format_days(row.duration));
        fields.push(row.reconnected.to_string());

        fields.join(&self.delimiter.to_string())
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        output.push_str(&self.header());
        output.push('\n');

        for row in &self.rows {
            output.push_str(&self.format_row(row));
            output.push('\n');
        }

        output
    }
}

/// CSV formatter for the per-dyad summary
#[derive(Debug)]
pub struct CsvStatsOutput {
    rows: Vec<DyadSummary>,
    delimiter: char,
}

impl Default for CsvStatsOutput {
    fn default() -> Self {
        Self::new(',')
    }
}

impl CsvStatsOutput {
    pub fn new(delimiter: char) -> Self {
        Self {
            rows: Vec::new(),
            delimiter,
        }
    }

    pub fn add_summary(&mut self, row: DyadSummary) {
        self.rows.push(row);
    }

    pub fn to_csv(&self) -> String {
        let sep = self.delimiter.to_string();
        let mut output = STATS_COLUMNS.join(&sep);
        output.push('\n');

        for row in &self.rows {
            let fields = [
                escape_field(&row.caller, self.delimiter),
                escape_field(&row.receiver, self.delimiter),
                row.calls.to_string(),
                row.reconnections.to_string(),
                row.censored.to_string(),
                row.duration.mean.to_string(),
                row.duration.median.to_string(),
                row.duration.min.to_string(),
                row.duration.max.to_string(),
            ];
            output.push_str(&fields.join(&sep));
            output.push('\n');
        }

        output
    }
}

/// Escape CSV field (handle delimiter, quotes, newlines)
pub fn escape_field(field: &str, delimiter: char) -> String {
    if field.contains(delimiter)
        || field.contains('"')
        || field.contains('\n')
        || field.contains('\r')
    {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Day counts always carry a decimal point so whole days stay visibly numeric
pub fn format_days(days: f64) -> String {
    if days.fract() == 0.0 && days.is_finite() {
        format!("{:.1}", days)
    } else {
        days.to_string()
    }
}
