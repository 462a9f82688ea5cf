//! Progress handler trait and events

use crate::acquire::CloneStatus;
use crate::build::{BuildStatus, PipelineStage};
use crate::detection::BuildSystemKind;
use std::time::Duration;

/// Events emitted while a batch is audited, in per-repository order:
/// `RepoStarted`, `Acquired`, then `Detected` and `Built` when the clone
/// succeeded, then `RepoFinished`.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    BatchStarted { total: usize },

    RepoStarted {
        url: String,
        index: usize,
        total: usize,
    },

    Acquired {
        url: String,
        status: CloneStatus,
        elapsed: Duration,
    },

    Detected {
        url: String,
        kind: BuildSystemKind,
        evidence: Vec<String>,
    },

    Built {
        url: String,
        status: BuildStatus,
        stage: PipelineStage,
        elapsed: Duration,
    },

    /// The record for this repository has been written
    RepoFinished {
        url: String,
        clone_status: CloneStatus,
        kind: BuildSystemKind,
        build_status: BuildStatus,
        stage: PipelineStage,
    },

    BatchFinished {
        processed: usize,
        built_ok: usize,
        total_time: Duration,
    },
}

pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
