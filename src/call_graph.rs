//! Weighted caller → receiver graph
//!
//! Every distinct (caller, receiver) pair becomes one directed edge whose
//! weight is the number of calls observed for that pair. Nodes are the union
//! of callers and receivers, numbered in first-seen order while edges are
//! added in (caller, receiver) order.
//!
//! # Example
//!
//! ```
//! use rellamar::call_graph::build_graph;
//! use rellamar::table::CallTable;
//!
//! # fn main() -> rellamar::error::Result<()> {
//! let table = CallTable::from_strs(
//!     &["caller", "receiver"],
//!     &[&["A", "B"], &["A", "B"], &["B", "C"]],
//! );
//!
//! let graph = build_graph(&table, "caller", "receiver")?;
//! assert_eq!(graph.node_count(), 3);
//! assert_eq!(graph.weight("A", "B"), Some(2));
//! assert_eq!(graph.weight("B", "C"), Some(1));
//! assert_eq!(graph.weight("C", "A"), None);
//! # Ok(())
//! # }
//! ```

use crate::error::{AnalyzerError, Result};
use crate::record::{CallRecord, EnrichedRecord};
use crate::table::CallTable;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use trueno_graph::{CsrGraph, NodeId};

/// A directed caller → receiver edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEdge {
    pub caller: String,
    pub receiver: String,
    /// Number of calls from `caller` to `receiver`
    pub weight: u64,
}

/// Call-count graph backed by trueno-graph's CSR storage
///
/// Labels and the sorted edge list are kept beside the CSR so that lookups
/// by name and ordered iteration do not depend on CSR internals.
pub struct CallGraph {
    graph: CsrGraph,
    labels: Vec<String>,
    label_to_node: HashMap<String, NodeId>,
    edges: Vec<CallEdge>,
}

/// Build a call graph from any table holding the two named columns
///
/// Rows where either key is null are skipped. Fails with a schema error
/// listing the required fields when a column is absent.
pub fn build_graph(table: &CallTable, caller_field: &str, receiver_field: &str) -> Result<CallGraph> {
    let indices = table.require_columns(&[caller_field, receiver_field])?;
    let (caller_idx, receiver_idx) = (indices[0], indices[1]);

    let mut counts: BTreeMap<(String, String), u64> = BTreeMap::new();
    let mut skipped = 0usize;

    for row in 0..table.len() {
        match (table.cell(row, caller_idx), table.cell(row, receiver_idx)) {
            (Some(caller), Some(receiver)) => {
                *counts
                    .entry((caller.to_string(), receiver.to_string()))
                    .or_default() += 1;
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!(
            "Skipped {} rows with a null '{}' or '{}'",
            skipped,
            caller_field,
            receiver_field
        );
    }

    CallGraph::from_counts(counts)
}

impl CallGraph {
    /// Graph with no nodes or edges
    pub fn empty() -> Self {
        Self {
            graph: CsrGraph::new(),
            labels: Vec::new(),
            label_to_node: HashMap::new(),
            edges: Vec::new(),
        }
    }

    /// Build from typed call records
    pub fn from_records(records: &[CallRecord]) -> Result<Self> {
        Self::from_dyads(records.iter().map(CallRecord::dyad))
    }

    /// Build from transformer output
    pub fn from_enriched(records: &[EnrichedRecord]) -> Result<Self> {
        Self::from_dyads(records.iter().map(EnrichedRecord::dyad))
    }

    /// Build from a sequence of (caller, receiver) pairs, one per call
    pub fn from_dyads<'a, I>(dyads: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut counts: BTreeMap<(String, String), u64> = BTreeMap::new();
        for (caller, receiver) in dyads {
            *counts
                .entry((caller.to_string(), receiver.to_string()))
                .or_default() += 1;
        }
        Self::from_counts(counts)
    }

    fn from_counts(counts: BTreeMap<(String, String), u64>) -> Result<Self> {
        let mut graph = Self::empty();
        let mut csr_edges = Vec::with_capacity(counts.len());

        for ((caller, receiver), weight) in counts {
            let from = graph.intern(&caller);
            let to = graph.intern(&receiver);
            csr_edges.push((from, to, weight as f32));
            graph.edges.push(CallEdge {
                caller,
                receiver,
                weight,
            });
        }

        graph.graph = CsrGraph::from_edge_list(&csr_edges)
            .map_err(|e| AnalyzerError::Graph(format!("building CSR: {}", e)))?;

        tracing::debug!(
            "Built call graph with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(graph)
    }

    fn intern(&mut self, label: &str) -> NodeId {
        if let Some(&node) = self.label_to_node.get(label) {
            return node;
        }
        let node = NodeId(self.labels.len() as u32);
        self.labels.push(label.to_string());
        self.label_to_node.insert(label.to_string(), node);
        node
    }

    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Node labels in insertion order
    pub fn nodes(&self) -> &[String] {
        &self.labels
    }

    /// Edges sorted by (caller, receiver)
    pub fn edges(&self) -> &[CallEdge] {
        &self.edges
    }

    pub fn contains_node(&self, label: &str) -> bool {
        self.label_to_node.contains_key(label)
    }

    /// Call count for `caller → receiver`, `None` if the pair never called
    pub fn weight(&self, caller: &str, receiver: &str) -> Option<u64> {
        self.edges
            .binary_search_by(|e| (e.caller.as_str(), e.receiver.as_str()).cmp(&(caller, receiver)))
            .ok()
            .map(|i| self.edges[i].weight)
    }

    /// Receivers called by `caller` with their call counts
    pub fn successors(&self, caller: &str) -> Vec<(&str, u64)> {
        let Some(&node) = self.label_to_node.get(caller) else {
            return Vec::new();
        };
        let outgoing = self.outgoing(caller);

        let (neighbors, _) = self.graph.adjacency(node);
        neighbors
            .iter()
            .filter_map(|&n| self.labels.get(n as usize))
            .filter_map(|label| {
                outgoing
                    .binary_search_by(|e| e.receiver.as_str().cmp(label.as_str()))
                    .ok()
                    .map(|i| (label.as_str(), outgoing[i].weight))
            })
            .collect()
    }

    /// Edges leaving `caller`, sorted by receiver
    fn outgoing(&self, caller: &str) -> &[CallEdge] {
        let start = self.edges.partition_point(|e| e.caller.as_str() < caller);
        let len = self.edges[start..].partition_point(|e| e.caller == caller);
        &self.edges[start..start + len]
    }

    /// Total calls placed by `caller`
    pub fn out_weight(&self, caller: &str) -> u64 {
        self.outgoing(caller).iter().map(|e| e.weight).sum()
    }

    /// Total calls received by `receiver`
    pub fn in_weight(&self, receiver: &str) -> u64 {
        self.edges
            .iter()
            .filter(|e| e.receiver == receiver)
            .map(|e| e.weight)
            .sum()
    }

    /// Total calls across all edges
    pub fn total_weight(&self) -> u64 {
        self.edges.iter().map(|e| e.weight).sum()
    }

    /// Underlying CSR graph for trueno-graph algorithms
    pub fn as_csr_graph(&self) -> &CsrGraph {
        &self.graph
    }
}

impl Default for CallGraph {
    fn default() -> Self {
        Self::empty()
    }
}
