//! Rellamar - time-to-reconnection analysis for call logs
//!
//! Turns a log of (caller, receiver, timestamp) records into survival-analysis
//! input: for each call, the days until the same pair called again (or until
//! the end of the observation window) and whether that next call happened.
//! It also builds the weighted caller → receiver graph of the same log.
//!
//! ```
//! use rellamar::config::AnalyzerConfig;
//! use rellamar::table::CallTable;
//! use rellamar::transform::transform_table;
//!
//! # fn main() -> rellamar::error::Result<()> {
//! let table = CallTable::parse(
//!     "caller,receiver,timestamp\nA,B,2024-01-01\nA,B,2024-01-06\n",
//!     ',',
//! )?;
//! let enriched = transform_table(&table, &AnalyzerConfig::default())?;
//! assert_eq!(enriched[0].duration, 5.0);
//! assert!(enriched[0].reconnected);
//! # Ok(())
//! # }
//! ```

pub mod call_graph;
pub mod cli;
pub mod config;
pub mod csv_output;
pub mod error;
pub mod json_output;
pub mod record;
pub mod render;
pub mod stats;
pub mod table;
pub mod timestamp;
pub mod transform;

pub use call_graph::{build_graph, CallEdge, CallGraph};
pub use config::AnalyzerConfig;
pub use error::{AnalyzerError, Result};
pub use record::{CallRecord, EnrichedRecord};
pub use table::CallTable;
pub use transform::{transform, transform_table};
