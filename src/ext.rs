use std::{borrow::Cow, fs, io::Write, path::Path, time::SystemTime};

use anyhow::{Context, Result};
use serde_json::Value;
use tempfile::NamedTempFile;

#[extend::ext]
pub impl Value {
  /// Returns the value as a finite number. Prometheus serializes sample values
  /// as strings, so numeric strings are accepted as well as JSON numbers.
  fn as_finite_number(&self) -> Option<f64> {
    let number = match self {
      Value::Number(n) => n.as_f64(),
      Value::String(s) => s.trim().parse::<f64>().ok(),
      _ => None,
    };

    number.filter(|n| n.is_finite())
  }

  /// Renders the value for display: strings verbatim, everything else as JSON.
  fn as_label(&self) -> Cow<'_, str> {
    match self {
      Value::String(s) => Cow::Borrowed(s),
      value => Cow::Owned(value.to_string()),
    }
  }
}

#[extend::ext]
pub impl Path {
  fn modified_time(&self) -> Result<SystemTime> {
    fs::metadata(self).context("metadata")?.modified().context("modified")
  }

  /// Writes `contents` through a temporary file in the same directory, then
  /// renames it over `self`.
  fn write_atomic(&self, contents: &str) -> Result<()> {
    let dir = match self.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent,
      _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).context("tempfile")?;
    file.write_all(contents.as_bytes()).context("write")?;
    file.persist(self).context("persist")?;

    Ok(())
  }
}
