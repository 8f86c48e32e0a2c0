//! Call records and their survival-analysis enrichment

use crate::config::AnalyzerConfig;
use crate::error::{AnalyzerError, Result};
use crate::table::CallTable;
use crate::timestamp::parse_timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One observed call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    pub caller: String,
    pub receiver: String,
    pub timestamp: NaiveDateTime,
}

impl CallRecord {
    pub fn new(
        caller: impl Into<String>,
        receiver: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            caller: caller.into(),
            receiver: receiver.into(),
            timestamp,
        }
    }

    /// The ordered (caller, receiver) pair this call belongs to
    pub fn dyad(&self) -> (&str, &str) {
        (&self.caller, &self.receiver)
    }
}

/// A call record with its time-to-next-call observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    /// Position of the record in the transformer input
    pub source_index: usize,
    pub caller: String,
    pub receiver: String,
    pub timestamp: NaiveDateTime,
    /// Next call between the same pair, if one was observed
    pub next_timestamp: Option<NaiveDateTime>,
    /// Days until `next_timestamp`, or until study end when censored
    pub duration: f64,
    /// Whether the pair called again within the observation window
    pub reconnected: bool,
}

impl EnrichedRecord {
    pub fn dyad(&self) -> (&str, &str) {
        (&self.caller, &self.receiver)
    }

    pub fn is_censored(&self) -> bool {
        !self.reconnected
    }
}

/// Extract typed call records from a table using the configured field names
///
/// Records keep table order, so `source_index` of the enriched output equals
/// the table row. The whole extraction fails on the first row with a null
/// field or an unparseable timestamp.
pub fn records_from_table(table: &CallTable, config: &AnalyzerConfig) -> Result<Vec<CallRecord>> {
    let (caller_field, receiver_field, timestamp_field) = config.fields();
    let indices = table.require_columns(&[caller_field, receiver_field, timestamp_field])?;
    let (caller_idx, receiver_idx, timestamp_idx) = (indices[0], indices[1], indices[2]);

    let mut records = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let required = |idx: usize, field: &str| {
            table.cell(row, idx).ok_or_else(|| AnalyzerError::InvalidInput {
                row: row + 1,
                message: format!("missing value for '{}'", field),
            })
        };

        let caller = required(caller_idx, caller_field)?;
        let receiver = required(receiver_idx, receiver_field)?;
        let raw_timestamp = required(timestamp_idx, timestamp_field)?;

        let timestamp =
            parse_timestamp(raw_timestamp).ok_or_else(|| AnalyzerError::InvalidInput {
                row: row + 1,
                message: format!(
                    "cannot parse '{}' value {:?} as a date-time",
                    timestamp_field, raw_timestamp
                ),
            })?;

        records.push(CallRecord::new(caller, receiver, timestamp));
    }

    Ok(records)
}
