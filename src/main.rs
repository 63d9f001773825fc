mod analysis;
mod chart;
mod config;
mod discover;
mod document;
mod ext;
mod extract;
mod load;
mod render;
mod summary;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use self::{analysis::Analysis, chart::ChartOptions, config::RenderConfig};

/// Charts Prometheus/Thanos query results collected during a benchmark run.
#[derive(Parser)]
#[command(name = "thanos-plot", version, about)]
struct Args {
  /// Log at debug level.
  #[arg(short, long, global = true)]
  verbose: bool,
  #[command(flatten)]
  render: RenderConfig,
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Plot the newest `results-thanos-*.json` in a directory, writing charts
  /// next to it.
  Plot {
    /// Benchmark output directory holding the results files.
    dir: PathBuf,
  },
  /// Analyze a results file, writing charts and a summary.
  Analyze {
    /// Path to the Thanos results JSON file.
    input_file: PathBuf,
    /// Directory for charts and the summary.
    #[arg(long, default_value = "plots")]
    output_dir: PathBuf,
  },
}

fn init_tracing(verbose: bool) {
  let level = if verbose { "thanos_plot=debug" } else { "thanos_plot=info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .try_init();
}

fn main() -> Result<()> {
  let args = Args::parse();
  init_tracing(args.verbose);

  let analysis = match args.command {
    Command::Plot { dir } => analysis_for_latest(dir, &args.render)?,
    Command::Analyze { input_file, output_dir } => {
      if !input_file.exists() {
        anyhow::bail!("file not found: {input_file:?}");
      }

      let options = ChartOptions::analysis().with_config(&args.render);
      Analysis::new(input_file, output_dir, options).context("Analysis::new")?
    }
  };

  let report = analysis.run().context("analysis failed")?;
  info!(
    plots = report.plots_created,
    dir = %analysis.output_dir().display(),
    "analysis complete"
  );

  Ok(())
}

/// Sets up an analysis of the newest results file in `dir`, with charts written
/// alongside it.
fn analysis_for_latest(dir: PathBuf, render: &RenderConfig) -> Result<Analysis> {
  let latest = discover::latest_results(&dir)?;
  info!(path = %latest.display(), "processing metrics");

  Analysis::new(latest, dir, ChartOptions::latest().with_config(render)).context("Analysis::new")
}
