//! JSON output for enriched tables, call graphs and dyad summaries

use crate::call_graph::{CallEdge, CallGraph};
use crate::error::Result;
use crate::record::EnrichedRecord;
use crate::stats::{DyadSummary, DyadTracker, SummaryTotals};
use crate::timestamp::format_timestamp;
use serde::{Deserialize, Serialize};

/// One enriched call as written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonCall {
    pub caller: String,
    pub receiver: String,
    pub timestamp: String,
    pub next_timestamp: Option<String>,
    /// Days until the next call or the end of the study
    pub duration: f64,
    pub reconnected: bool,
}

impl From<&EnrichedRecord> for JsonCall {
    fn from(record: &EnrichedRecord) -> Self {
        Self {
            caller: record.caller.clone(),
            receiver: record.receiver.clone(),
            timestamp: format_timestamp(record.timestamp),
            next_timestamp: record.next_timestamp.map(format_timestamp),
            duration: record.duration,
            reconnected: record.reconnected,
        }
    }
}

/// Transformer output document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonTransformOutput {
    pub version: String,
    pub format: String,
    /// Latest timestamp in the input, absent for an empty table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_end: Option<String>,
    pub calls: Vec<JsonCall>,
}

impl JsonTransformOutput {
    pub fn new(records: &[EnrichedRecord]) -> Self {
        let study_end = records.iter().map(|r| r.timestamp).max().map(format_timestamp);

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "rellamar-transform-v1".to_string(),
            study_end,
            calls: records.iter().map(JsonCall::from).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        to_pretty(self)
    }
}

/// Call graph document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonGraphOutput {
    pub version: String,
    pub format: String,
    pub nodes: Vec<String>,
    pub edges: Vec<CallEdge>,
}

impl JsonGraphOutput {
    pub fn new(graph: &CallGraph) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "rellamar-graph-v1".to_string(),
            nodes: graph.nodes().to_vec(),
            edges: graph.edges().to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        to_pretty(self)
    }
}

/// Dyad summary document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSummaryOutput {
    pub version: String,
    pub format: String,
    pub totals: SummaryTotals,
    pub dyads: Vec<DyadSummary>,
}

impl JsonSummaryOutput {
    pub fn new(tracker: &DyadTracker) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "rellamar-summary-v1".to_string(),
            totals: tracker.totals(),
            dyads: tracker.summaries(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        to_pretty(self)
    }
}

fn to_pretty<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CallRecord;
    use crate::transform::transform;
    use chrono::{Duration, NaiveDate};

    fn records() -> Vec<EnrichedRecord> {
        let t0 = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        transform(&[
            CallRecord::new("A", "B", t0),
            CallRecord::new("A", "B", t0 + Duration::days(3)),
            CallRecord::new("C", "D", t0 + Duration::days(1)),
        ])
    }

    #[test]
    fn test_transform_json() {
        let output = JsonTransformOutput::new(&records());
        assert_eq!(output.format, "rellamar-transform-v1");
        assert_eq!(output.study_end.as_deref(), Some("2024-01-04T00:00:00"));
        assert_eq!(output.calls.len(), 3);

        let json = output.to_json().unwrap();
        assert!(json.contains("\"next_timestamp\": \"2024-01-04T00:00:00\""));
        assert!(json.contains("\"next_timestamp\": null"));
        assert!(json.contains("\"duration\": 2.0"));
        assert!(json.contains("\"reconnected\": true"));
    }

    #[test]
    fn test_empty_transform_omits_study_end() {
        let json = JsonTransformOutput::new(&[]).to_json().unwrap();
        assert!(!json.contains("study_end"));
        assert!(json.contains("\"calls\": []"));
    }

    #[test]
    fn test_graph_json_round_trip() {
        let graph = CallGraph::from_enriched(&records()).unwrap();
        let json = JsonGraphOutput::new(&graph).to_json().unwrap();

        let parsed: JsonGraphOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.nodes, vec!["A", "B", "C", "D"]);
        assert_eq!(parsed.edges.len(), 2);
        assert_eq!(parsed.edges[0].weight, 2);
    }

    #[test]
    fn test_summary_json() {
        let tracker = DyadTracker::from_records(&records());
        let json = JsonSummaryOutput::new(&tracker).to_json().unwrap();
        assert!(json.contains("\"format\": \"rellamar-summary-v1\""));
        assert!(json.contains("\"reconnections\": 1"));
        assert!(json.contains("\"dyads\": 2"));
    }
}
