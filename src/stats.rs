//! Per-dyad reconnection summary
//!
//! Groups transformer output by (caller, receiver) and reports how many
//! calls each pair made, how many were followed by another call, how many
//! were censored, and the spread of their durations. These are the inputs a
//! survival fit per dyad needs; the fit itself happens elsewhere.

use crate::record::EnrichedRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts and durations for one (caller, receiver) pair
#[derive(Debug, Clone, Default)]
pub struct DyadStats {
    /// Calls observed for this pair
    pub count: u64,
    /// Calls followed by another call from the same pair
    pub reconnections: u64,
    /// Calls whose next call was not observed
    pub censored: u64,
    /// Durations in days, in transformer order
    pub durations: Vec<f64>,
}

/// Duration spread for one dyad, in days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationStats {
    pub mean: f32,
    pub min: f32,
    pub max: f32,
    pub median: f32,
}

/// One row of the summary report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DyadSummary {
    pub caller: String,
    pub receiver: String,
    pub calls: u64,
    pub reconnections: u64,
    pub censored: u64,
    pub duration: DurationStats,
}

/// Totals across every dyad
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryTotals {
    pub dyads: usize,
    pub calls: u64,
    pub reconnections: u64,
    pub censored: u64,
}

/// Accumulates per-dyad statistics from enriched records
#[derive(Debug, Default)]
pub struct DyadTracker {
    stats: BTreeMap<(String, String), DyadStats>,
}

impl DyadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tracker from transformer output
    pub fn from_records(records: &[EnrichedRecord]) -> Self {
        let mut tracker = Self::new();
        for record in records {
            tracker.record(record);
        }
        tracker
    }

    /// Record one enriched call
    pub fn record(&mut self, record: &EnrichedRecord) {
        let entry = self
            .stats
            .entry((record.caller.clone(), record.receiver.clone()))
            .or_default();
        entry.count += 1;
        entry.durations.push(record.duration);
        if record.reconnected {
            entry.reconnections += 1;
        } else {
            entry.censored += 1;
        }
    }

    pub fn get(&self, caller: &str, receiver: &str) -> Option<&DyadStats> {
        self.stats.get(&(caller.to_string(), receiver.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Totals across all dyads
    pub fn totals(&self) -> SummaryTotals {
        self.stats.values().fold(
            SummaryTotals {
                dyads: self.stats.len(),
                calls: 0,
                reconnections: 0,
                censored: 0,
            },
            |mut totals, s| {
                totals.calls += s.count;
                totals.reconnections += s.reconnections;
                totals.censored += s.censored;
                totals
            },
        )
    }

    /// Calculate percentile from sorted data
    fn calculate_percentile(sorted_data: &[f32], percentile: f32) -> f32 {
        if sorted_data.is_empty() {
            return 0.0;
        }
        if sorted_data.len() == 1 {
            return sorted_data[0];
        }

        let index = (percentile / 100.0) * (sorted_data.len() - 1) as f32;
        let lower = index.floor() as usize;
        let upper = index.ceil() as usize;

        if lower == upper {
            sorted_data[lower]
        } else {
            let weight = index - lower as f32;
            sorted_data[lower] * (1.0 - weight) + sorted_data[upper] * weight
        }
    }

    fn duration_stats(durations: &[f64]) -> DurationStats {
        let durations: Vec<f32> = durations.iter().map(|&d| d as f32).collect();
        let v = trueno::Vector::from_slice(&durations);

        let mut sorted = durations.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        DurationStats {
            mean: v.mean().unwrap_or(0.0),
            min: v.min().unwrap_or(0.0),
            max: v.max().unwrap_or(0.0),
            median: Self::calculate_percentile(&sorted, 50.0),
        }
    }

    /// Summary rows ordered by (caller, receiver)
    pub fn summaries(&self) -> Vec<DyadSummary> {
        self.stats
            .iter()
            .map(|((caller, receiver), stats)| DyadSummary {
                caller: caller.clone(),
                receiver: receiver.clone(),
                calls: stats.count,
                reconnections: stats.reconnections,
                censored: stats.censored,
                duration: Self::duration_stats(&stats.durations),
            })
            .collect()
    }

    /// Plain-text report
    pub fn to_text(&self) -> String {
        if self.stats.is_empty() {
            return "No calls recorded.\n".to_string();
        }

        let mut out = String::new();
        out.push_str(&format!(
            "{:<16} {:<16} {:>6} {:>8} {:>8} {:>10} {:>10} {:>10} {:>10}\n",
            "caller", "receiver", "calls", "events", "censored", "mean", "median", "min", "max"
        ));
        out.push_str(&format!("{}\n", "-".repeat(100)));

        for row in self.summaries() {
            out.push_str(&format!(
                "{:<16} {:<16} {:>6} {:>8} {:>8} {:>10.3} {:>10.3} {:>10.3} {:>10.3}\n",
                row.caller,
                row.receiver,
                row.calls,
                row.reconnections,
                row.censored,
                row.duration.mean,
                row.duration.median,
                row.duration.min,
                row.duration.max
            ));
        }

        let totals = self.totals();
        out.push_str(&format!("{}\n", "-".repeat(100)));
        out.push_str(&format!(
            "{} dyads, {} calls, {} reconnections, {} censored\n",
            totals.dyads, totals.calls, totals.reconnections, totals.censored
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CallRecord;
    use crate::transform::transform;
    use chrono::{Duration, NaiveDate};

    fn enriched(calls: &[(&str, &str, i64)]) -> Vec<EnrichedRecord> {
        let t0 = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let records: Vec<CallRecord> = calls
            .iter()
            .map(|&(c, r, d)| CallRecord::new(c, r, t0 + Duration::days(d)))
            .collect();
        transform(&records)
    }

    #[test]
    fn test_empty_tracker() {
        let tracker = DyadTracker::new();
        assert!(tracker.is_empty());
        assert_eq!(tracker.totals().calls, 0);
        assert!(tracker.summaries().is_empty());
        assert_eq!(tracker.to_text(), "No calls recorded.\n");
    }

    #[test]
    fn test_counts_per_dyad() {
        let tracker =
            DyadTracker::from_records(&enriched(&[("A", "B", 0), ("A", "B", 5), ("A", "B", 12)]));

        let stats = tracker.get("A", "B").unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.reconnections, 2);
        assert_eq!(stats.censored, 1);
        assert_eq!(stats.durations, vec![5.0, 7.0, 0.0]);
        assert!(tracker.get("B", "A").is_none());
    }

    #[test]
    fn test_duration_stats() {
        let tracker =
            DyadTracker::from_records(&enriched(&[("A", "B", 0), ("A", "B", 5), ("A", "B", 12)]));

        let rows = tracker.summaries();
        assert_eq!(rows.len(), 1);
        let d = &rows[0].duration;
        assert_eq!(d.min, 0.0);
        assert_eq!(d.max, 7.0);
        assert_eq!(d.median, 5.0);
        assert!((d.mean - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_totals() {
        let tracker = DyadTracker::from_records(&enriched(&[
            ("A", "B", 0),
            ("A", "B", 3),
            ("C", "D", 1),
        ]));

        let totals = tracker.totals();
        assert_eq!(
            totals,
            SummaryTotals {
                dyads: 2,
                calls: 3,
                reconnections: 1,
                censored: 2,
            }
        );
    }

    #[test]
    fn test_totals_exact_beyond_f32_precision() {
        let mut tracker = DyadTracker::new();
        tracker.stats.insert(
            ("A".to_string(), "B".to_string()),
            DyadStats {
                count: 16_777_217,
                reconnections: 16_777_216,
                censored: 1,
                durations: Vec::new(),
            },
        );

        let totals = tracker.totals();
        assert_eq!(totals.calls, 16_777_217);
        assert_eq!(totals.reconnections, 16_777_216);
        assert_eq!(totals.censored, 1);
    }

    #[test]
    fn test_percentile() {
        assert_eq!(DyadTracker::calculate_percentile(&[], 50.0), 0.0);
        assert_eq!(DyadTracker::calculate_percentile(&[3.0], 50.0), 3.0);
        assert_eq!(DyadTracker::calculate_percentile(&[1.0, 2.0], 50.0), 1.5);
    }

    #[test]
    fn test_text_report() {
        let tracker = DyadTracker::from_records(&enriched(&[("A", "B", 0), ("C", "D", 2)]));
        let text = tracker.to_text();
        assert!(text.contains("caller"));
        assert!(text.contains("2 dyads, 2 calls, 0 reconnections, 2 censored"));
    }
}
