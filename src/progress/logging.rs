//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use crate::acquire::CloneStatus;
use crate::build::BuildStatus;
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::BatchStarted { total } => {
                info!(total, "Starting batch audit");
            }
            ProgressEvent::RepoStarted { url, index, total } => {
                info!(
                    repo = %url,
                    progress = format!("{}/{}", index, total),
                    "Auditing repository"
                );
            }
            ProgressEvent::Acquired {
                url,
                status,
                elapsed,
            } => {
                if *status == CloneStatus::Ok {
                    debug!(repo = %url, duration_ms = elapsed.as_millis() as u64, "Repository acquired");
                } else {
                    warn!(repo = %url, duration_ms = elapsed.as_millis() as u64, "Acquisition failed");
                }
            }
            ProgressEvent::Detected {
                url,
                kind,
                evidence,
            } => {
                debug!(repo = %url, kind = %kind, evidence = ?evidence, "Build system detected");
            }
            ProgressEvent::Built {
                url,
                status,
                stage,
                elapsed,
            } => {
                if *status == BuildStatus::Ok {
                    debug!(repo = %url, duration_ms = elapsed.as_millis() as u64, "Build succeeded");
                } else {
                    debug!(
                        repo = %url,
                        stage = %stage,
                        duration_ms = elapsed.as_millis() as u64,
                        "Build failed"
                    );
                }
            }
            ProgressEvent::RepoFinished {
                url,
                clone_status,
                kind,
                build_status,
                stage,
            } => {
                info!(
                    repo = %url,
                    clone = %clone_status,
                    kind = %kind,
                    build = %build_status,
                    stage = %stage,
                    "Repository audited"
                );
            }
            ProgressEvent::BatchFinished {
                processed,
                built_ok,
                total_time,
            } => {
                info!(
                    processed,
                    built_ok,
                    total_time_ms = total_time.as_millis() as u64,
                    "Batch audit complete"
                );
            }
        }
    }
}
