use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
  document::{MetricResult, MetricsDocument, Sample, Series},
  ext::ValueExt,
};

const SUCCESS: &str = "success";

/// Prometheus encodes missing samples as the string `"NaN"`. They are plotted
/// as zero.
const NAN: &str = "NaN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  Successful,
  Failed,
  Empty,
}

/// Buckets a raw metric entry. Anything that is not an object with
/// `status: "success"` has failed; a successful query without results is
/// empty.
pub fn classify(entry: &Value) -> Outcome {
  let Some(entry) = entry.as_object() else {
    return Outcome::Failed;
  };

  if entry.get("status").and_then(Value::as_str) != Some(SUCCESS) {
    return Outcome::Failed;
  }

  let has_results = entry
    .get("data")
    .and_then(|data| data.get("result"))
    .is_some_and(is_truthy);

  if has_results {
    Outcome::Successful
  } else {
    Outcome::Empty
  }
}

fn is_truthy(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
    Value::String(s) => !s.is_empty(),
    Value::Array(a) => !a.is_empty(),
    Value::Object(o) => !o.is_empty(),
  }
}

/// Metric names of a document, bucketed by [`Outcome`] in document order.
#[derive(Debug, Default)]
pub struct Classification {
  pub successful: Vec<String>,
  pub failed: Vec<String>,
  pub empty: Vec<String>,
}

impl Classification {
  pub fn of(doc: &MetricsDocument) -> Self {
    let mut classification = Self::default();

    for (name, entry) in &doc.metrics {
      let bucket = match classify(entry) {
        Outcome::Successful => &mut classification.successful,
        Outcome::Failed => &mut classification.failed,
        Outcome::Empty => &mut classification.empty,
      };

      bucket.push(name.clone());
    }

    classification
  }

  pub fn total(&self) -> usize {
    self.successful.len() + self.failed.len() + self.empty.len()
  }
}

/// Decodes the series of a successful metric entry. Series without any usable
/// sample are dropped; entries that did not succeed yield nothing.
///
/// # Errors
///
/// This will return an error if the entry does not match the
/// `{status, data: {result: [{metric, values: [[ts, value], ...]}]}}` shape.
pub fn extract_series(entry: &Value) -> Result<Vec<Series>> {
  let metric = MetricResult::deserialize(entry).context("unexpected metric shape")?;

  if metric.status.as_deref() != Some(SUCCESS) {
    return Ok(Vec::new());
  }

  let series = metric
    .data
    .result
    .into_iter()
    .filter_map(|raw| {
      let samples = raw
        .values
        .iter()
        .filter_map(|(timestamp, value)| decode_sample(timestamp, value))
        .collect::<Vec<_>>();

      if samples.is_empty() {
        debug!(labels = ?raw.metric, "dropping series without samples");
        return None;
      }

      Some(Series {
        labels: raw.metric,
        samples,
      })
    })
    .collect();

  Ok(series)
}

fn decode_sample(timestamp: &Value, value: &Value) -> Option<Sample> {
  let timestamp = timestamp.as_finite_number()?;
  let value = match value {
    Value::String(s) if s == NAN => 0.0,
    value => value.as_finite_number()?,
  };

  Some(Sample { timestamp, value })
}
