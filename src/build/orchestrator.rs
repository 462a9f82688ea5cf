use super::outcome::BuildOutcome;
use super::procedure::{ProcedureRegistry, ProcedureSettings};
use super::runner::CommandRunner;
use super::stage::StepStage;
use super::worktree::WorkTree;
use crate::config::AuditConfig;
use crate::detection::BuildSystemKind;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct BuildSettings {
    /// Budget for each step on its own, not for the whole pipeline
    pub timeout: Duration,
    pub procedure: ProcedureSettings,
}

impl BuildSettings {
    pub fn from_config(config: &AuditConfig) -> Self {
        Self {
            timeout: config.timeout(),
            procedure: ProcedureSettings {
                build_dir_name: config.build_dir_name.clone(),
                jobs: config.effective_jobs(),
                toolchain: config.toolchain.clone(),
            },
        }
    }
}

/// Runs the staged configure/build/test pipeline for one repository.
///
/// Steps run strictly in order and the first failing step ends the
/// pipeline; its stage and log become the outcome. Each `build` call owns
/// the repository root and deletes it before returning, whatever the result.
pub struct BuildOrchestrator {
    runner: Arc<dyn CommandRunner>,
    registry: ProcedureRegistry,
    settings: BuildSettings,
}

impl BuildOrchestrator {
    pub fn new(runner: Arc<dyn CommandRunner>, settings: BuildSettings) -> Self {
        Self {
            runner,
            registry: ProcedureRegistry::with_defaults(),
            settings,
        }
    }

    pub fn with_registry(mut self, registry: ProcedureRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    pub async fn build(&self, root: &Path, kind: BuildSystemKind) -> BuildOutcome {
        let tree = WorkTree::claim(root);
        let start = Instant::now();

        let outcome = self.run_pipeline(tree.root(), kind).await;

        info!(
            root = %root.display(),
            kind = %kind,
            status = %outcome.status(),
            stage = %outcome.stage(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Build pipeline finished"
        );

        drop(tree);
        outcome
    }

    async fn run_pipeline(&self, root: &Path, kind: BuildSystemKind) -> BuildOutcome {
        let Some(procedure) = self.registry.get(kind) else {
            info!(kind = %kind, "No build procedure for kind, skipping");
            return BuildOutcome::unsupported(kind);
        };

        let build_dir = procedure.build_dir(root, &self.settings.procedure);
        if let Err(e) = tokio::fs::create_dir_all(&build_dir).await {
            warn!(build_dir = %build_dir.display(), error = %e, "Cannot create build directory");
            return BuildOutcome::failed(
                StepStage::Configuration,
                format!(
                    "Failed to create build directory {}: {}",
                    build_dir.display(),
                    e
                ),
            );
        }

        let mut last_log = String::new();
        for step in procedure.steps(root, &self.settings.procedure) {
            info!(stage = %step.stage, command = %step.command, "Running build step");

            let output = self.runner.run(&step.command, self.settings.timeout).await;
            if !output.passed() {
                warn!(
                    stage = %step.stage,
                    command = %step.command,
                    termination = ?output.termination,
                    duration_ms = output.duration_ms,
                    "Build step failed"
                );
                return BuildOutcome::failed(step.stage, output.log);
            }
            last_log = output.log;
        }

        BuildOutcome::succeeded(last_log)
    }
}
