use std::{
  fs,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::{
  chart::ChartOptions,
  document::MetricsDocument,
  ext::PathExt,
  extract::{self, Classification},
  load,
  render::{self, Chart},
  summary,
};

/// Outcome of analyzing a single results file.
#[derive(Debug)]
pub struct Report {
  pub file: PathBuf,
  pub benchmark_start: String,
  pub benchmark_end: String,
  pub classification: Classification,
  pub plots_created: usize,
}

pub struct Analysis {
  /// Thanos results file being analyzed.
  input: PathBuf,
  /// Directory receiving charts and the summary.
  output_dir: PathBuf,
  options: ChartOptions,
}

impl Analysis {
  pub fn new(input: PathBuf, output_dir: PathBuf, options: ChartOptions) -> Result<Self> {
    fs::create_dir_all(&output_dir).with_context(|| format!("create_dir {output_dir:?}"))?;

    Ok(Self {
      input,
      output_dir,
      options,
    })
  }

  /// Loads the input, charts every successful metric and writes the summary.
  /// Failures on individual metrics are logged and skipped.
  pub fn run(&self) -> Result<Report> {
    let doc = load::load_document(&self.input).with_context(|| format!("load {:?}", self.input))?;

    let benchmark_start = doc.benchmark_start().into_owned();
    let benchmark_end = doc.benchmark_end().into_owned();

    info!(start = %benchmark_start, end = %benchmark_end, "benchmark period");
    info!(count = doc.available_vllm_count(), "available vLLM metrics");
    info!(count = doc.metrics.len(), "total metrics collected");

    let classification = Classification::of(&doc);
    info!(
      successful = classification.successful.len(),
      failed = classification.failed.len(),
      empty = classification.empty.len(),
      "classified metrics"
    );

    let plots_created = self.plot_all(&doc, &classification.successful, &benchmark_start, &benchmark_end);
    info!(count = plots_created, dir = %self.output_dir.display(), "plots created");

    let report = Report {
      file: self.input.clone(),
      benchmark_start,
      benchmark_end,
      classification,
      plots_created,
    };

    let summary_path = self.output_dir.join(summary::SUMMARY_FILE);
    summary_path
      .write_atomic(&summary::format(&report).context("format")?)
      .with_context(|| format!("write {summary_path:?}"))?;
    info!(path = %summary_path.display(), "analysis summary saved");

    Ok(report)
  }

  fn plot_all(&self, doc: &MetricsDocument, metrics: &[String], start: &str, end: &str) -> usize {
    let mut plots = 0;

    for metric in metrics {
      let Some(entry) = doc.metrics.get(metric) else {
        continue;
      };

      match self.plot(metric, entry, start, end) {
        Ok(Some(path)) => {
          info!(path = %path.display(), "generated plot");
          plots += 1;
        }
        Ok(None) => warn!(metric = %metric, "no data for metric"),
        Err(err) => error!(metric = %metric, error = %format!("{err:#}"), "error plotting metric"),
      }
    }

    plots
  }

  /// Renders one metric, returning the chart path, or `None` if none of its
  /// series had usable samples.
  fn plot(&self, metric: &str, entry: &Value, start: &str, end: &str) -> Result<Option<PathBuf>> {
    let series = extract::extract_series(entry).context("extract")?;
    if series.is_empty() {
      return Ok(None);
    }

    let chart = Chart {
      metric,
      title: self.options.title(metric, start, end),
      series: &series,
    };
    let path = self.output_dir.join(self.options.file_name(metric));

    render::render(&chart, &self.options, &path).context("render")?;

    Ok(Some(path))
  }

  pub fn output_dir(&self) -> &Path {
    &self.output_dir
  }
}
