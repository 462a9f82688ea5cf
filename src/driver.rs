//! Batch driver: acquire, detect, build and record each repository in turn

use crate::acquire::{CloneStatus, RepoFetcher};
use crate::build::{BuildOrchestrator, BuildSettings, BuildStatus, CommandRunner};
use crate::config::AuditConfig;
use crate::detection::BuildSystemDetector;
use crate::output::{AuditRecord, JsonlSink, SinkError};
use crate::progress::{NoOpHandler, ProgressEvent, ProgressHandler};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Counts over one `run`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub cloned: usize,
    pub built_ok: usize,
    /// Records whose build status is not `OK`, including never-built ones
    pub failed: usize,
}

impl BatchSummary {
    fn add(&mut self, record: &AuditRecord) {
        self.processed += 1;
        if record.clone_status == CloneStatus::Ok {
            self.cloned += 1;
        }
        if record.build_status == BuildStatus::Ok {
            self.built_ok += 1;
        } else {
            self.failed += 1;
        }
    }
}

pub struct BatchDriver {
    fetcher: RepoFetcher,
    detector: BuildSystemDetector,
    orchestrator: BuildOrchestrator,
    progress: Arc<dyn ProgressHandler>,
    log_limit: usize,
}

impl BatchDriver {
    pub fn new(
        config: &AuditConfig,
        workspace: impl Into<PathBuf>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            fetcher: RepoFetcher::new(
                runner.clone(),
                workspace,
                config.toolchain.git.clone(),
                config.timeout(),
            ),
            detector: BuildSystemDetector::default(),
            orchestrator: BuildOrchestrator::new(runner, BuildSettings::from_config(config)),
            progress: Arc::new(NoOpHandler),
            log_limit: config.log_limit,
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_detector(mut self, detector: BuildSystemDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Audits one repository. Never fails: every problem ends up in the record.
    pub async fn process(&self, url: &str) -> AuditRecord {
        let start = Instant::now();
        let acquisition = self.fetcher.acquire(url).await;
        self.progress.on_progress(&ProgressEvent::Acquired {
            url: url.to_string(),
            status: acquisition.status,
            elapsed: start.elapsed(),
        });

        let Some(root) = acquisition.path.clone().filter(|_| acquisition.is_ok()) else {
            return AuditRecord::acquisition_failed(url, &acquisition, self.log_limit);
        };

        let detection = self.detector.detect(&root);
        self.progress.on_progress(&ProgressEvent::Detected {
            url: url.to_string(),
            kind: detection.kind,
            evidence: detection.evidence.clone(),
        });

        let build_start = Instant::now();
        let outcome = self.orchestrator.build(&root, detection.kind).await;
        self.progress.on_progress(&ProgressEvent::Built {
            url: url.to_string(),
            status: outcome.status(),
            stage: outcome.stage(),
            elapsed: build_start.elapsed(),
        });

        AuditRecord::built(url, &acquisition, detection, &outcome, self.log_limit)
    }

    /// Audits `urls` in order, writing each record before starting the next.
    ///
    /// Only a results-file failure stops the batch.
    pub async fn run(&self, urls: &[String], sink: &mut JsonlSink) -> Result<BatchSummary, SinkError> {
        let start = Instant::now();
        let total = urls.len();
        let mut summary = BatchSummary::default();

        self.progress.on_progress(&ProgressEvent::BatchStarted { total });

        for (i, url) in urls.iter().enumerate() {
            self.progress.on_progress(&ProgressEvent::RepoStarted {
                url: url.clone(),
                index: i + 1,
                total,
            });

            let record = self.process(url).await;
            sink.write(&record)?;
            summary.add(&record);

            self.progress.on_progress(&ProgressEvent::RepoFinished {
                url: url.clone(),
                clone_status: record.clone_status,
                kind: record.build_type,
                build_status: record.build_status,
                stage: record.failure_stage,
            });
        }

        info!(
            processed = summary.processed,
            built_ok = summary.built_ok,
            results = %sink.path().display(),
            "Batch finished"
        );
        self.progress.on_progress(&ProgressEvent::BatchFinished {
            processed: summary.processed,
            built_ok: summary.built_ok,
            total_time: start.elapsed(),
        });

        Ok(summary)
    }
}
