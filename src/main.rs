use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use eyre::{Context, Result};
use tracing::debug;
use tracing_subscriber::{
    EnvFilter, fmt::layer, layer::SubscriberExt, util::SubscriberInitExt,
};

use iosched_plots::chart::{ChartMode, ChartSpec};
use iosched_plots::render;
use iosched_plots::report::Report;

/// Render comparative bar charts from I/O scheduler benchmark reports.
#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a benchmark report to an image or the system viewer
    Render {
        /// Benchmark report file
        input: PathBuf,
        /// Output image extension (svg, png, ...); opens a viewer when
        /// omitted
        extension: Option<String>,
        /// Bar style: grouped latency bars or stacked throughput layers
        #[arg(short, long, value_enum, default_value_t = Mode::Grouped)]
        mode: Mode,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Grouped,
    Stacked,
}

impl From<Mode> for ChartMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Grouped => ChartMode::Grouped,
            Mode::Stacked => ChartMode::Stacked,
        }
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let log_level = std::env::var("RUST_LOG").unwrap_or("warn".to_owned());
    tracing_subscriber::registry()
        .with(EnvFilter::new(format!("iosched_plots={log_level}")))
        .with(layer().compact())
        .init();

    match args.command {
        Commands::Render {
            input,
            extension,
            mode,
        } => run(mode.into(), &input, extension.as_deref()),
    }
}

fn run(mode: ChartMode, input: &Path, extension: Option<&str>) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .context(format!("read report {}", input.display()))?;
    let report = Report::parse(&text)
        .context(format!("parse report {}", input.display()))?;
    debug!(subplots = report.num_subplots(), "report parsed");

    let spec = ChartSpec::compose(&report, mode)?;
    match extension {
        Some(ext) => render::save(&spec, &input.with_extension(ext)),
        None => render::show(&spec),
    }
}
