use std::ops::Range;

use serde_json::{Map, Value};

use crate::{config::RenderConfig, document::Series, ext::ValueExt};

/// How metric names are turned into file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Naming {
  /// Only path separators (`:` and `/`) are replaced.
  Separators,
  /// Everything outside `[A-Za-z0-9_-]` is replaced.
  Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Title {
  /// Metric name followed by the benchmark period.
  WithPeriod,
  /// `Metric: <name>`.
  MetricOnly,
}

/// Everything that decides what a chart looks like and where it is written.
#[derive(Debug, Clone)]
pub struct ChartOptions {
  pub file_prefix: &'static str,
  pub naming: Naming,
  pub title: Title,
  /// Label keys never shown in legends.
  pub excluded_labels: &'static [&'static str],
  pub max_label_pairs: usize,
  /// Label values at least this long are left out of legends.
  pub max_label_value_len: Option<usize>,
  /// Legend entries read `<metric> (k=v, ...)` instead of `k=v, ...`.
  pub prefix_metric_name: bool,
  pub legend_min_series: usize,
  pub legend_limit: usize,
  pub width: u32,
  pub height: u32,
}

impl ChartOptions {
  /// Charts written next to the newest results file by `plot`.
  pub fn latest() -> Self {
    Self {
      file_prefix: "",
      naming: Naming::Separators,
      title: Title::WithPeriod,
      excluded_labels: &["__name__"],
      max_label_pairs: 2,
      max_label_value_len: None,
      prefix_metric_name: true,
      legend_min_series: 2,
      legend_limit: 10,
      width: 1800,
      height: 900,
    }
  }

  /// Charts written by `analyze`.
  pub fn analysis() -> Self {
    Self {
      file_prefix: "plot_",
      naming: Naming::Strict,
      title: Title::MetricOnly,
      excluded_labels: &["__name__", "prometheus", "job"],
      max_label_pairs: 3,
      max_label_value_len: Some(20),
      prefix_metric_name: false,
      legend_min_series: 1,
      legend_limit: 10,
      width: 1800,
      height: 1200,
    }
  }

  pub fn with_config(mut self, config: &RenderConfig) -> Self {
    if let Some(width) = config.width {
      self.width = width;
    }
    if let Some(height) = config.height {
      self.height = height;
    }
    if let Some(limit) = config.legend_limit {
      self.legend_limit = limit;
    }

    self
  }

  pub fn file_name(&self, metric: &str) -> String {
    let safe = metric
      .chars()
      .map(|c| match self.naming {
        Naming::Separators if c == ':' || c == '/' => '_',
        Naming::Strict if !(c.is_ascii_alphanumeric() || c == '_' || c == '-') => '_',
        _ => c,
      })
      .collect::<String>();

    format!("{}{safe}.png", self.file_prefix)
  }

  pub fn title(&self, metric: &str, start: &str, end: &str) -> String {
    match self.title {
      Title::WithPeriod => format!("{metric} - Benchmark Period: {start} to {end}"),
      Title::MetricOnly => format!("Metric: {metric}"),
    }
  }

  /// Legend entry for one series. Falls back to the metric name when no label
  /// survives filtering.
  pub fn series_label(&self, metric: &str, labels: &Map<String, Value>) -> String {
    let pairs = labels
      .iter()
      .filter(|(key, _)| !self.excluded_labels.contains(&key.as_str()))
      .map(|(key, value)| (key, value.as_label()))
      .filter(|(_, value)| {
        self
          .max_label_value_len
          .map_or(true, |max| value.chars().count() < max)
      })
      .map(|(key, value)| format!("{key}={value}"))
      .collect::<Vec<_>>();

    if pairs.is_empty() {
      return metric.to_string();
    }

    let mut label = pairs[..pairs.len().min(self.max_label_pairs)].join(", ");
    if self.prefix_metric_name {
      label = format!("{metric} ({label})");
    } else if pairs.len() > self.max_label_pairs {
      label.push_str("...");
    }

    label
  }

  pub fn show_legend(&self, series_count: usize) -> bool {
    (self.legend_min_series..=self.legend_limit).contains(&series_count)
  }
}

/// Axis ranges covering every sample, padded so lines do not touch the frame.
/// Both ranges have a finite, positive width.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
  pub x: Range<f64>,
  pub y: Range<f64>,
}

/// Seconds added on each side of a time axis with a single instant.
const INSTANT_PADDING: f64 = 30.0;

/// Returns `None` when there are no samples, or when the padded ranges would not
/// fit in an `f64`.
pub fn bounds(series: &[Series]) -> Option<Bounds> {
  let mut samples = series.iter().flat_map(|s| &s.samples);
  let first = samples.next()?;

  let (mut x_min, mut x_max) = (first.timestamp, first.timestamp);
  let (mut y_min, mut y_max) = (first.value, first.value);
  for sample in samples {
    x_min = x_min.min(sample.timestamp);
    x_max = x_max.max(sample.timestamp);
    y_min = y_min.min(sample.value);
    y_max = y_max.max(sample.value);
  }

  let x = if x_min == x_max {
    x_min - INSTANT_PADDING..x_max + INSTANT_PADDING
  } else {
    x_min..x_max
  };

  let y_pad = if y_min == y_max {
    (y_min.abs() * 0.1).max(1.0)
  } else {
    y_max / 20.0 - y_min / 20.0
  };
  let y = y_min - y_pad..y_max + y_pad;

  let usable = |range: &Range<f64>| {
    let width = range.end - range.start;
    width.is_finite() && width > 0.0
  };
  if !usable(&x) || !usable(&y) {
    return None;
  }

  Some(Bounds { x, y })
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::document::Sample;

  fn labels(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
  }

  fn series(points: &[(f64, f64)]) -> Series {
    Series {
      labels: Map::new(),
      samples: points
        .iter()
        .map(|&(timestamp, value)| Sample { timestamp, value })
        .collect(),
    }
  }

  #[test]
  fn test_file_names() {
    assert_eq!(
      ChartOptions::latest().file_name("vllm:e2e_request_latency/seconds"),
      "vllm_e2e_request_latency_seconds.png"
    );
    assert_eq!(
      ChartOptions::analysis().file_name("rate(vllm:tokens_total[1m])"),
      "plot_rate_vllm_tokens_total_1m__.png"
    );
  }

  #[test]
  fn test_latest_labels() {
    let options = ChartOptions::latest();
    let labels = labels(json!({"__name__": "up", "job": "vllm", "pod": "p-0", "gpu": "0"}));

    assert_eq!(options.series_label("up", &labels), "up (job=vllm, pod=p-0)");
    assert_eq!(options.series_label("up", &Map::new()), "up");
  }

  #[test]
  fn test_analysis_labels() {
    let options = ChartOptions::analysis();
    let labels = labels(json!({
      "__name__": "up",
      "prometheus": "monitoring/k8s",
      "job": "vllm",
      "instance": "10.0.0.1:8000",
      "pod": "vllm-deployment-abcdef-12345",
      "model": "llama",
      "gpu": 0,
      "node": "worker-1"
    }));

    assert_eq!(options.series_label("up", &labels), "instance=10.0.0.1:8000, model=llama, gpu=0...");
  }

  #[test]
  fn test_analysis_label_without_pairs() {
    let options = ChartOptions::analysis();
    let labels = labels(json!({"__name__": "up", "job": "vllm"}));

    assert_eq!(options.series_label("up", &labels), "up");
  }

  #[test]
  fn test_legend_threshold() {
    let latest = ChartOptions::latest();
    assert!(!latest.show_legend(1));
    assert!(latest.show_legend(2));
    assert!(latest.show_legend(10));
    assert!(!latest.show_legend(11));

    let analysis = ChartOptions::analysis().with_config(&RenderConfig {
      legend_limit: Some(3),
      ..Default::default()
    });
    assert!(analysis.show_legend(1));
    assert!(!analysis.show_legend(4));
  }

  #[test]
  fn test_config_overrides_preset() {
    let options = ChartOptions::latest().with_config(&RenderConfig {
      width: Some(640),
      height: None,
      legend_limit: None,
    });

    assert_eq!((options.width, options.height), (640, 900));
  }

  #[test]
  fn test_bounds() {
    let bounds = bounds(&[series(&[(100.0, 0.0), (200.0, 10.0)]), series(&[(150.0, 20.0)])]).unwrap();

    assert_eq!(bounds.x, 100.0..200.0);
    assert_eq!(bounds.y, -1.0..21.0);
  }

  #[test]
  fn test_degenerate_bounds() {
    let bounds = bounds(&[series(&[(100.0, 0.0)])]).unwrap();

    assert_eq!(bounds.x, 70.0..130.0);
    assert_eq!(bounds.y, -1.0..1.0);
  }

  #[test]
  fn test_extreme_values_have_no_bounds() {
    assert_eq!(bounds(&[series(&[(1.0, 1e308), (2.0, -1e308)])]), None);
    assert_eq!(bounds(&[series(&[(1.0, f64::MAX)])]), None);
    assert_eq!(bounds(&[series(&[(f64::MAX, 1.0)])]), None);
  }

  #[test]
  fn test_large_values_have_bounds() {
    let bounds = bounds(&[series(&[(1.0, 1e300), (2.0, -1e300)])]).unwrap();

    assert!(bounds.y.start < -1e300 && bounds.y.end > 1e300);
    assert!((bounds.y.end - bounds.y.start).is_finite());
  }

  #[test]
  fn test_titles() {
    assert_eq!(
      ChartOptions::latest().title("up", "10:00", "10:05"),
      "up - Benchmark Period: 10:00 to 10:05"
    );
    assert_eq!(ChartOptions::analysis().title("up", "10:00", "10:05"), "Metric: up");
  }

  #[test]
  fn test_no_samples() {
    assert_eq!(bounds(&[]), None);
  }
}
