use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn, Level};

use sweep_core::export::chart::{ChartSink, JsonChartWriter};
use sweep_core::export::table::CsvTableWriter;
use sweep_core::utils::conf_helper::init_config;

#[derive(Parser, Debug)]
#[command(name = "sweep_averager")]
#[command(about = "Baseline-correct, filter and average repeated measurement sweeps")]
struct Args {
    /// JSON configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the input tables
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output path prefix
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Input column delimiter
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Skip chart export
    #[arg(long)]
    no_charts: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    if let Err(e) = run(args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let (input, output, delimiter) = (args.input, args.output, args.delimiter);
    let config = init_config(args.config.as_deref(), |config| {
        // === CLI OVERRIDES ===
        if let Some(input) = input {
            config.input.directory = input;
        }
        if let Some(output) = output {
            config.output.name = output;
        }
        if let Some(delimiter) = delimiter {
            config.input.delimiter = delimiter;
        }
    })
    .context("Failed to load configuration")?;

    info!(
        "Reading {} into {}",
        config.input.directory.display(),
        config.output.name.display()
    );

    let mut tables = CsvTableWriter::new(&config.output.name);
    let mut charts = JsonChartWriter::new(&config.output.name);
    let charts: Option<&mut dyn ChartSink> = if args.no_charts {
        None
    } else {
        Some(&mut charts)
    };

    let summary = sweep_core::run(config, &mut tables, charts).context("Processing failed")?;

    if summary.chunks_kept == 0 {
        warn!("Every chunk was dropped, averages are empty");
    }
    info!(
        "Done: {} chunks read, {} kept, {} dropped ({} malformed)",
        summary.chunks_read, summary.chunks_kept, summary.chunks_dropped, summary.chunks_malformed
    );
    for path in &summary.files_written {
        info!("Wrote {}", path.display());
    }
    Ok(())
}
