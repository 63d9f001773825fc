use std::{
  fs,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::debug;

use crate::ext::PathExt;

const RESULTS_PREFIX: &str = "results-thanos-";
const RESULTS_SUFFIX: &str = ".json";

fn is_results_file(name: &str) -> bool {
  name.len() >= RESULTS_PREFIX.len() + RESULTS_SUFFIX.len()
    && name.starts_with(RESULTS_PREFIX)
    && name.ends_with(RESULTS_SUFFIX)
}

/// Returns the most recently modified `results-thanos-*.json` file in `dir`.
/// Ties are broken by file name.
///
/// # Errors
///
/// This will return an error if:
/// - `dir` cannot be read.
/// - no file in `dir` matches.
pub fn latest_results<P: AsRef<Path>>(dir: P) -> Result<PathBuf> {
  let dir = dir.as_ref();

  let mut candidates = Vec::new();
  for entry in fs::read_dir(dir).with_context(|| format!("read dir {dir:?}"))? {
    let path = entry.context("dir entry")?.path();
    let matches = path.file_name().and_then(|name| name.to_str()).is_some_and(is_results_file);

    if matches && path.is_file() {
      let modified = path.modified_time().with_context(|| format!("{path:?}"))?;
      debug!(path = %path.display(), "found results file");
      candidates.push((modified, path));
    }
  }

  candidates
    .into_iter()
    .max()
    .map(|(_, path)| path)
    .with_context(|| format!("no Thanos results files found in {dir:?}"))
}

#[cfg(test)]
mod tests {
  use std::{
    fs::File,
    time::{Duration, SystemTime},
  };

  use tempfile::TempDir;

  use super::*;

  fn touch(dir: &Path, name: &str, age: Duration) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();

    path
  }

  #[test]
  fn test_matching_names() {
    assert!(is_results_file("results-thanos-2024-05-01.json"));
    assert!(is_results_file("results-thanos-.json"));
    assert!(!is_results_file("results-thanos.json"));
    assert!(!is_results_file("results-prometheus-1.json"));
    assert!(!is_results_file("results-thanos-1.json.bak"));
  }

  #[test]
  fn test_picks_newest() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "results-thanos-old.json", Duration::from_secs(3600));
    let newest = touch(dir.path(), "results-thanos-new.json", Duration::from_secs(60));
    touch(dir.path(), "results-other.json", Duration::ZERO);

    assert_eq!(latest_results(dir.path()).unwrap(), newest);
  }

  #[test]
  fn test_ignores_directories() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("results-thanos-dir.json")).unwrap();

    assert!(latest_results(dir.path()).is_err());
  }

  #[test]
  fn test_no_matching_files() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "notes.txt", Duration::ZERO);

    let err = latest_results(dir.path()).unwrap_err();
    assert!(err.to_string().contains("no Thanos results files found"));
  }

  #[test]
  fn test_missing_dir() {
    let dir = TempDir::new().unwrap();

    assert!(latest_results(dir.path().join("missing")).is_err());
  }
}
