use std::borrow::Cow;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::ext::ValueExt;

const UNKNOWN: &str = "Unknown";

/// A Thanos results dump, as written by the benchmark harness.
///
/// Metric entries are kept as raw JSON so that a single malformed entry can be
/// classified and skipped without rejecting the whole document.
#[derive(Debug, Default, Deserialize)]
pub struct MetricsDocument {
  #[serde(default)]
  benchmark_start: Value,
  #[serde(default)]
  benchmark_end: Value,
  #[serde(default)]
  available_vllm_metrics: Option<String>,
  #[serde(default)]
  pub metrics: Map<String, Value>,
}

impl MetricsDocument {
  pub fn benchmark_start(&self) -> Cow<'_, str> {
    free_text(&self.benchmark_start)
  }

  pub fn benchmark_end(&self) -> Cow<'_, str> {
    free_text(&self.benchmark_end)
  }

  /// Number of vLLM metric names the harness advertised, if any.
  pub fn available_vllm_count(&self) -> usize {
    self
      .available_vllm_metrics
      .as_deref()
      .map_or(0, |names| names.split_whitespace().count())
  }
}

fn free_text(value: &Value) -> Cow<'_, str> {
  match value {
    Value::Null => Cow::Borrowed(UNKNOWN),
    value => value.as_label(),
  }
}

/// The typed view of a single metric entry, `{status, data: {result: [...]}}`.
#[derive(Debug, Deserialize)]
pub struct MetricResult {
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default)]
  pub data: ResultData,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResultData {
  #[serde(default)]
  pub result: Vec<RawSeries>,
}

/// A series as it appears on the wire. Samples are `[timestamp, value]` pairs
/// whose components may be numbers or numeric strings.
#[derive(Debug, Deserialize)]
pub struct RawSeries {
  #[serde(default)]
  pub metric: Map<String, Value>,
  #[serde(default)]
  pub values: Vec<(Value, Value)>,
}

/// One decoded sample: epoch seconds and value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
  pub timestamp: f64,
  pub value: f64,
}

/// A labeled, time-ordered sequence of samples ready for plotting.
#[derive(Debug, Clone)]
pub struct Series {
  pub labels: Map<String, Value>,
  pub samples: Vec<Sample>,
}
