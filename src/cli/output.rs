//! Console output: detection reports and per-repository progress lines

use anyhow::{Context, Result};
use std::path::Path;

use crate::detection::Detection;
use crate::driver::BatchSummary;
use crate::progress::{LoggingHandler, ProgressEvent, ProgressHandler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Human,
}

/// Formats the result of `detect`
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, path: &Path, detection: &Detection) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_json(path, detection),
            OutputFormat::Human => Ok(self.format_human(path, detection)),
        }
    }

    fn format_json(&self, path: &Path, detection: &Detection) -> Result<String> {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "build_type": detection.kind,
            "evidence": detection.evidence,
        });
        serde_json::to_string_pretty(&output).context("Failed to serialize detection result to JSON")
    }

    fn format_human(&self, path: &Path, detection: &Detection) -> String {
        let evidence = if detection.evidence.is_empty() {
            "(none)".to_string()
        } else {
            detection.evidence.join(", ")
        };

        format!(
            "Repository:   {}\nBuild system: {}\nEvidence:     {}",
            path.display(),
            detection.kind,
            evidence
        )
    }
}

/// `<url> -> clone=<s> type=<k> build=<s> stage=<st>`
pub fn progress_line(event: &ProgressEvent) -> Option<String> {
    match event {
        ProgressEvent::RepoFinished {
            url,
            clone_status,
            kind,
            build_status,
            stage,
        } => Some(format!(
            "{} -> clone={} type={} build={} stage={}",
            url, clone_status, kind, build_status, stage
        )),
        _ => None,
    }
}

pub fn format_summary(summary: &BatchSummary, results: &Path) -> String {
    format!(
        "Processed {} repositories: {} cloned, {} built OK, {} failed. Results: {}",
        summary.processed,
        summary.cloned,
        summary.built_ok,
        summary.failed,
        results.display()
    )
}

/// Prints one line per finished repository to stdout; every event is also
/// logged
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleProgressHandler;

impl ProgressHandler for ConsoleProgressHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        LoggingHandler.on_progress(event);
        if let Some(line) = progress_line(event) {
            println!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::CloneStatus;
    use crate::build::{BuildStatus, PipelineStage};
    use crate::detection::BuildSystemKind;
    use std::path::PathBuf;

    fn detection() -> Detection {
        Detection {
            kind: BuildSystemKind::Autotools,
            evidence: vec!["configure.ac".to_string(), "Makefile.am".to_string()],
        }
    }

    #[test]
    fn test_human_format() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let output = formatter.format(Path::new("/src/app"), &detection()).unwrap();

        assert!(output.contains("Build system: AUTOTOOLS"));
        assert!(output.contains("configure.ac, Makefile.am"));
        assert!(output.contains("/src/app"));
    }

    #[test]
    fn test_human_format_without_evidence() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let output = formatter.format(Path::new("/src/app"), &Detection::other()).unwrap();

        assert!(output.contains("Build system: OTHER"));
        assert!(output.contains("(none)"));
    }

    #[test]
    fn test_json_format() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format(Path::new("/src/app"), &detection()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["build_type"], "AUTOTOOLS");
        assert_eq!(value["evidence"][1], "Makefile.am");
        assert_eq!(value["path"], "/src/app");
    }

    #[test]
    fn test_progress_line() {
        let event = ProgressEvent::RepoFinished {
            url: "https://github.com/madler/zlib.git".to_string(),
            clone_status: CloneStatus::Ok,
            kind: BuildSystemKind::CMake,
            build_status: BuildStatus::Fail,
            stage: PipelineStage::Testing,
        };

        assert_eq!(
            progress_line(&event).unwrap(),
            "https://github.com/madler/zlib.git -> clone=OK type=CMAKE build=FAIL stage=TESTING"
        );
        assert!(progress_line(&ProgressEvent::BatchStarted { total: 1 }).is_none());
    }

    #[test]
    fn test_summary() {
        let summary = BatchSummary {
            processed: 3,
            cloned: 2,
            built_ok: 1,
            failed: 2,
        };
        let line = format_summary(&summary, &PathBuf::from("results/results.jsonl"));
        assert_eq!(
            line,
            "Processed 3 repositories: 2 cloned, 1 built OK, 2 failed. Results: results/results.jsonl"
        );
    }
}
