use std::{
  fs, io,
  path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::document::MetricsDocument;

static REPEATED_COMMAS: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*,").expect("valid regex"));
static TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*([}\]])").expect("valid regex"));

#[derive(Debug, Error)]
pub enum LoadError {
  #[error("failed to read {path:?}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("JSON still invalid after repair: {0}")]
  Parse(#[source] serde_json::Error),

  #[error("unexpected document shape: {0}")]
  Shape(#[source] serde_json::Error),
}

/// Reads and parses a Thanos results file, repairing stray commas if the
/// strict parse fails.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<MetricsDocument, LoadError> {
  let path = path.as_ref();

  info!(path = %path.display(), "reading file");
  let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  info!(chars = content.chars().count(), "original file size");

  let value = parse(&content)?;

  serde_json::from_value(value).map_err(LoadError::Shape)
}

/// Strict parse, falling back to a single repaired retry.
pub fn parse(content: &str) -> Result<Value, LoadError> {
  let err = match serde_json::from_str(content) {
    Ok(value) => return Ok(value),
    Err(err) => err,
  };

  warn!(error = %err, "invalid JSON, attempting repair");

  let value = serde_json::from_str(&repair(content)).map_err(LoadError::Parse)?;
  info!("JSON is valid after repair");

  Ok(value)
}

/// Collapses repeated commas and drops commas directly before a closing brace
/// or bracket. This is purely textual, so commas inside string literals are
/// rewritten too.
pub fn repair(content: &str) -> String {
  let mut repaired = content.to_string();
  while REPEATED_COMMAS.is_match(&repaired) {
    repaired = REPEATED_COMMAS.replace_all(&repaired, ",").into_owned();
  }

  TRAILING_COMMA.replace_all(&repaired, "$1").into_owned()
}
