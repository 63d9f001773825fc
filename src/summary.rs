use std::fmt::Write;

use anyhow::Result;

use crate::analysis::Report;

pub const SUMMARY_FILE: &str = "analysis_summary.txt";

const TITLE: &str = "THANOS METRICS ANALYSIS SUMMARY";
const RULE_WIDTH: usize = 40;

fn write_names(summary: &mut String, heading: &str, names: &[String]) -> Result<()> {
  writeln!(summary, "{heading}:")?;
  for name in names {
    writeln!(summary, "  - {name}")?;
  }

  Ok(())
}

pub fn format(report: &Report) -> Result<String> {
  let classification = &report.classification;
  let mut summary = String::new();

  writeln!(summary, "{TITLE}")?;
  writeln!(summary, "{}", "=".repeat(RULE_WIDTH))?;
  writeln!(summary)?;

  writeln!(summary, "File analyzed: {}", report.file.display())?;
  writeln!(summary, "Benchmark period: {} to {}", report.benchmark_start, report.benchmark_end)?;
  writeln!(summary, "Total metrics: {}", classification.total())?;
  writeln!(summary, "Successful: {}", classification.successful.len())?;
  writeln!(summary, "Failed: {}", classification.failed.len())?;
  writeln!(summary, "Empty: {}", classification.empty.len())?;
  writeln!(summary, "Plots created: {}", report.plots_created)?;
  writeln!(summary)?;

  if !classification.failed.is_empty() {
    write_names(&mut summary, "FAILED METRICS", &classification.failed)?;
    writeln!(summary)?;
  }

  if !classification.empty.is_empty() {
    write_names(&mut summary, "EMPTY METRICS", &classification.empty)?;
    writeln!(summary)?;
  }

  write_names(&mut summary, "SUCCESSFUL METRICS", &classification.successful)?;

  Ok(summary)
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use super::*;
  use crate::extract::Classification;

  fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
  }

  #[test]
  fn test_full_summary() {
    let report = Report {
      file: PathBuf::from("out/results-thanos-1.json"),
      benchmark_start: "10:00".to_string(),
      benchmark_end: "10:05".to_string(),
      classification: Classification {
        successful: names(&["up", "vllm:num_requests_running"]),
        failed: names(&["broken"]),
        empty: names(&["idle"]),
      },
      plots_created: 2,
    };

    let expected = "\
THANOS METRICS ANALYSIS SUMMARY
========================================

File analyzed: out/results-thanos-1.json
Benchmark period: 10:00 to 10:05
Total metrics: 4
Successful: 2
Failed: 1
Empty: 1
Plots created: 2

FAILED METRICS:
  - broken

EMPTY METRICS:
  - idle

SUCCESSFUL METRICS:
  - up
  - vllm:num_requests_running
";

    assert_eq!(format(&report).unwrap(), expected);
  }

  #[test]
  fn test_sections_omitted_when_empty() {
    let report = Report {
      file: PathBuf::from("r.json"),
      benchmark_start: "Unknown".to_string(),
      benchmark_end: "Unknown".to_string(),
      classification: Classification::default(),
      plots_created: 0,
    };

    let summary = format(&report).unwrap();

    assert!(!summary.contains("FAILED METRICS"));
    assert!(!summary.contains("EMPTY METRICS"));
    assert!(summary.ends_with("Plots created: 0\n\nSUCCESSFUL METRICS:\n"));
  }
}
