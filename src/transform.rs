//! Time-to-reconnection transformation
//!
//! For every call, find the next call between the same (caller, receiver)
//! pair. Reconnected calls measure the gap to that next call; the last call
//! of each pair is censored and measures the gap to the end of the study,
//! which is the latest timestamp anywhere in the input.
//!
//! ```text
//! (A,B,t0) (A,B,t0+5d) (A,B,t0+12d)      study_end = t0+12d
//!    │  5d  ▲   │  7d   ▲    │ 0d (censored)
//!    └──────┘   └───────┘    └──► study_end
//! ```

use crate::config::AnalyzerConfig;
use crate::error::{AnalyzerError, Result};
use crate::record::{records_from_table, CallRecord, EnrichedRecord};
use crate::table::CallTable;
use crate::timestamp::days_between;
use std::cmp::Ordering;

/// Enrich call records with `next_timestamp`, `duration` and `reconnected`
///
/// Output is ordered by (caller, receiver, timestamp); ties keep input order.
/// Empty input yields empty output.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use rellamar::record::CallRecord;
/// use rellamar::transform::transform;
///
/// let t0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let records = vec![
///     CallRecord::new("A", "B", t0),
///     CallRecord::new("A", "B", t0 + chrono::Duration::days(5)),
/// ];
///
/// let enriched = transform(&records);
/// assert_eq!(enriched[0].duration, 5.0);
/// assert!(enriched[0].reconnected);
/// assert_eq!(enriched[1].duration, 0.0);
/// assert!(!enriched[1].reconnected);
/// ```
pub fn transform(records: &[CallRecord]) -> Vec<EnrichedRecord> {
    let Some(end) = study_end(records) else {
        return Vec::new();
    };

    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|&a, &b| compare_records(&records[a], &records[b]));

    let mut enriched = Vec::with_capacity(records.len());
    let mut groups = 0usize;

    for (pos, &idx) in order.iter().enumerate() {
        let record = &records[idx];

        let next_timestamp = order
            .get(pos + 1)
            .map(|&next| &records[next])
            .filter(|next| next.dyad() == record.dyad())
            .map(|next| next.timestamp);

        if next_timestamp.is_none() {
            groups += 1;
        }

        let duration = days_between(record.timestamp, next_timestamp.unwrap_or(end));

        enriched.push(EnrichedRecord {
            source_index: idx,
            caller: record.caller.clone(),
            receiver: record.receiver.clone(),
            timestamp: record.timestamp,
            next_timestamp,
            duration,
            reconnected: next_timestamp.is_some(),
        });
    }

    tracing::debug!(
        "Transformed {} calls across {} dyads (study end {})",
        enriched.len(),
        groups,
        end
    );

    enriched
}

/// Read records from a table with the configured fields, then transform them
///
/// Fails as a whole if any row lacks a field or has an unparseable timestamp.
pub fn transform_table(table: &CallTable, config: &AnalyzerConfig) -> Result<Vec<EnrichedRecord>> {
    let records = records_from_table(table, config)?;
    Ok(transform(&records))
}

/// Load the configured call log and transform it
///
/// Returns the source table alongside the enriched records so callers can
/// emit the original columns next to the new ones.
pub fn read_and_transform(config: &AnalyzerConfig) -> Result<(CallTable, Vec<EnrichedRecord>)> {
    let path = config
        .csv_file
        .as_ref()
        .ok_or_else(|| AnalyzerError::Config("no input file configured (csv_file)".to_string()))?;

    let table = CallTable::from_path(path, config.delimiter)?;
    let records = transform_table(&table, config)?;
    Ok((table, records))
}

/// Latest timestamp across all records
pub fn study_end(records: &[CallRecord]) -> Option<chrono::NaiveDateTime> {
    records.iter().map(|r| r.timestamp).max()
}

fn compare_records(a: &CallRecord, b: &CallRecord) -> Ordering {
    a.caller
        .cmp(&b.caller)
        .then_with(|| a.receiver.cmp(&b.receiver))
        .then_with(|| a.timestamp.cmp(&b.timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn call(caller: &str, receiver: &str, days: i64) -> CallRecord {
        CallRecord::new(caller, receiver, t0() + Duration::days(days))
    }

    #[test]
    fn test_empty_input() {
        assert!(transform(&[]).is_empty());
        assert_eq!(study_end(&[]), None);
    }

    #[test]
    fn test_single_record_zero_duration() {
        let out = transform(&[call("A", "B", 0)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].duration, 0.0);
        assert!(!out[0].reconnected);
        assert_eq!(out[0].next_timestamp, None);
    }

    #[test]
    fn test_chain_of_calls() {
        let out = transform(&[call("A", "B", 12), call("A", "B", 0), call("A", "B", 5)]);

        let durations: Vec<f64> = out.iter().map(|r| r.duration).collect();
        assert_eq!(durations, vec![5.0, 7.0, 0.0]);

        let reconnected: Vec<bool> = out.iter().map(|r| r.reconnected).collect();
        assert_eq!(reconnected, vec![true, true, false]);

        let sources: Vec<usize> = out.iter().map(|r| r.source_index).collect();
        assert_eq!(sources, vec![1, 2, 0]);
    }

    #[test]
    fn test_censoring_uses_global_study_end() {
        let out = transform(&[call("A", "B", 0), call("A", "B", 3), call("C", "D", 1)]);

        assert_eq!(out[2].caller, "C");
        assert_eq!(out[2].duration, 2.0);
        assert!(!out[2].reconnected);
    }

    #[test]
    fn test_reverse_direction_is_separate_dyad() {
        let out = transform(&[call("A", "B", 0), call("B", "A", 2)]);

        assert!(out.iter().all(|r| !r.reconnected));
        assert_eq!(out[0].duration, 2.0);
        assert_eq!(out[1].duration, 0.0);
    }

    #[test]
    fn test_duplicate_timestamps_reconnect_with_zero_gap() {
        let out = transform(&[call("A", "B", 1), call("A", "B", 1), call("A", "B", 4)]);

        assert_eq!(out[0].source_index, 0);
        assert_eq!(out[1].source_index, 1);
        assert_eq!(out[0].duration, 0.0);
        assert!(out[0].reconnected);
        assert_eq!(out[1].duration, 3.0);
        assert!(out[2].is_censored());
    }

    #[test]
    fn test_fractional_days() {
        let late = CallRecord::new("A", "B", t0() + Duration::hours(36));
        let out = transform(&[call("A", "B", 0), late]);
        assert_eq!(out[0].duration, 1.5);
    }

    #[test]
    fn test_transform_table() {
        let table = CallTable::from_strs(
            &["caller", "receiver", "timestamp"],
            &[
                &["B", "C", "2024-01-02"],
                &["A", "B", "2024-01-01"],
                &["A", "B", "2024-01-04"],
            ],
        );

        let out = transform_table(&table, &AnalyzerConfig::default()).unwrap();
        assert_eq!(out[0].dyad(), ("A", "B"));
        assert_eq!(out[0].duration, 3.0);
        assert_eq!(out[2].dyad(), ("B", "C"));
        assert_eq!(out[2].duration, 2.0);
        assert_eq!(out[2].source_index, 0);
    }

    #[test]
    fn test_read_and_transform_requires_input() {
        let result = read_and_transform(&AnalyzerConfig::default());
        assert!(matches!(result, Err(AnalyzerError::Config(_))));
    }

    #[test]
    fn test_transform_table_fails_whole_on_bad_row() {
        let table = CallTable::from_strs(
            &["caller", "receiver", "timestamp"],
            &[&["A", "B", "2024-01-01"], &["A", "B", "soon"]],
        );
        assert!(transform_table(&table, &AnalyzerConfig::default()).is_err());
    }
}
