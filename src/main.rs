use anyhow::{Context, Result};
use clap::Parser;
use rellamar::call_graph::{build_graph, CallGraph};
use rellamar::cli::{Cli, Command, GraphFormat, InputArgs, OutputFormat};
use rellamar::config::AnalyzerConfig;
use rellamar::csv_output::{format_days, CsvOutput, CsvStatsOutput};
use rellamar::json_output::{JsonGraphOutput, JsonSummaryOutput, JsonTransformOutput};
use rellamar::record::EnrichedRecord;
use rellamar::render::{to_dot, SvgRenderer};
use rellamar::stats::DyadTracker;
use rellamar::table::CallTable;
use rellamar::timestamp::format_timestamp;
use rellamar::transform::read_and_transform;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; `--debug` forces TRACE, otherwise RUST_LOG (default warn)
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Merge config file values with command-line overrides (flags win)
fn resolve_config(config_path: Option<&Path>, input: &InputArgs) -> Result<AnalyzerConfig> {
    let mut config = match config_path {
        Some(path) => AnalyzerConfig::from_toml(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };

    if let Some(path) = &input.input {
        config.csv_file = Some(path.clone());
    }
    if let Some(field) = &input.caller_field {
        config.caller_field = field.clone();
    }
    if let Some(field) = &input.receiver_field {
        config.receiver_field = field.clone();
    }
    if let Some(field) = &input.timestamp_field {
        config.timestamp_field = field.clone();
    }
    if let Some(delimiter) = input.delimiter {
        config.delimiter = delimiter;
    }

    config.validate()?;
    Ok(config)
}

fn load_table(config: &AnalyzerConfig) -> Result<CallTable> {
    let Some(path) = &config.csv_file else {
        anyhow::bail!("No input file. Pass --input FILE or set csv_file in the --config file.");
    };
    Ok(CallTable::from_path(path, config.delimiter)?)
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}

fn enriched_text(records: &[EnrichedRecord]) -> String {
    let mut out = format!(
        "{:<16} {:<16} {:<26} {:<26} {:>10} {:>11}\n",
        "caller", "receiver", "timestamp", "next_timestamp", "duration", "reconnected"
    );
    for r in records {
        out.push_str(&format!(
            "{:<16} {:<16} {:<26} {:<26} {:>10} {:>11}\n",
            r.caller,
            r.receiver,
            format_timestamp(r.timestamp),
            r.next_timestamp.map(format_timestamp).unwrap_or_else(|| "-".to_string()),
            format_days(r.duration),
            r.reconnected
        ));
    }
    out
}

fn graph_text(graph: &CallGraph) -> String {
    let mut out = format!(
        "{} nodes, {} edges, {} calls\n",
        graph.node_count(),
        graph.edge_count(),
        graph.total_weight()
    );
    for edge in graph.edges() {
        out.push_str(&format!(
            "{} -> {} ({})\n",
            edge.caller, edge.receiver, edge.weight
        ));
    }
    out
}

fn run_transform(config: &AnalyzerConfig, format: OutputFormat) -> Result<String> {
    let (table, records) = read_and_transform(config)?;

    Ok(match format {
        OutputFormat::Csv => CsvOutput::from_table(&table, &records, config.delimiter).to_csv(),
        OutputFormat::Json => JsonTransformOutput::new(&records).to_json()?,
        OutputFormat::Text => enriched_text(&records),
    })
}

fn run_graph(config: &AnalyzerConfig, format: GraphFormat, scale: f64) -> Result<String> {
    let table = load_table(config)?;
    let graph = build_graph(&table, &config.caller_field, &config.receiver_field)?;

    Ok(match format {
        GraphFormat::Text => graph_text(&graph),
        GraphFormat::Json => JsonGraphOutput::new(&graph).to_json()?,
        GraphFormat::Dot => to_dot(&graph),
        GraphFormat::Svg => SvgRenderer::new().with_scale(scale).render(&graph),
    })
}

fn run_summary(config: &AnalyzerConfig, format: OutputFormat) -> Result<String> {
    let (_, records) = read_and_transform(config)?;
    let tracker = DyadTracker::from_records(&records);

    Ok(match format {
        OutputFormat::Text => tracker.to_text(),
        OutputFormat::Json => JsonSummaryOutput::new(&tracker).to_json()?,
        OutputFormat::Csv => {
            let mut output = CsvStatsOutput::new(config.delimiter);
            for row in tracker.summaries() {
                output.add_summary(row);
            }
            output.to_csv()
        }
    })
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let input = args.command.input();
    let config = resolve_config(args.config.as_deref(), input)?;
    tracing::debug!("Resolved configuration: {:?}", config);

    let content = match &args.command {
        Command::Transform { format, .. } => run_transform(&config, *format)?,
        Command::Graph { format, scale, .. } => {
            if !(*scale > 0.0 && *scale <= 1.0) {
                anyhow::bail!("Invalid value for --scale: {} (must be in (0, 1])", scale);
            }
            run_graph(&config, *format, *scale)?
        }
        Command::Summary { format, .. } => run_summary(&config, *format)?,
    };

    write_output(input.output.as_deref(), &content)
}
