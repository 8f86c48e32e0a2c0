//! CLI argument parsing for Rellamar

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for the enriched table and the dyad summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis (default)
    Csv,
}

/// Output format for the call graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    /// One `caller -> receiver (weight)` line per edge
    Text,
    /// JSON nodes and weighted edges
    Json,
    /// Graphviz DOT
    Dot,
    /// SVG drawing on a circular layout
    Svg,
}

#[derive(Parser, Debug)]
#[command(name = "rellamar")]
#[command(version)]
#[command(about = "Time-to-reconnection survival tables and call graphs from call logs", long_about = None)]
pub struct Cli {
    /// TOML configuration file (input path, column names, delimiter)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging to stderr
    #[arg(long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add next_timestamp, duration and reconnected to every call
    Transform {
        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(long = "format", value_enum, default_value = "csv")]
        format: OutputFormat,
    },

    /// Build the weighted caller -> receiver graph
    Graph {
        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(long = "format", value_enum, default_value = "text")]
        format: GraphFormat,

        /// Shrink factor applied to the circular layout (svg only)
        #[arg(long = "scale", value_name = "FACTOR", default_value = "0.25")]
        scale: f64,
    },

    /// Per-dyad counts of reconnections, censored calls and durations
    Summary {
        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(long = "format", value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// Input options shared by every subcommand; each overrides the config file
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Call log to read (delimited text with a header row)
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Column holding the caller
    #[arg(long = "caller-field", value_name = "NAME")]
    pub caller_field: Option<String>,

    /// Column holding the receiver
    #[arg(long = "receiver-field", value_name = "NAME")]
    pub receiver_field: Option<String>,

    /// Column holding the call timestamp
    #[arg(long = "timestamp-field", value_name = "NAME")]
    pub timestamp_field: Option<String>,

    /// Field delimiter
    #[arg(short = 'd', long = "delimiter", value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Write output to FILE instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl Command {
    pub fn input(&self) -> &InputArgs {
        match self {
            Command::Transform { input, .. }
            | Command::Graph { input, .. }
            | Command::Summary { input, .. } => input,
        }
    }
}
