//! Per-kind build procedures
//!
//! A procedure turns a repository root into the ordered configure, build
//! and test steps for one build-system kind. Kinds without a registered
//! procedure are reported as unsupported by the orchestrator.

use super::runner::StepCommand;
use super::stage::StepStage;
use crate::config::Toolchain;
use crate::detection::BuildSystemKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Settings shared by every procedure
#[derive(Debug, Clone)]
pub struct ProcedureSettings {
    pub build_dir_name: String,
    /// Parallelism passed to the native build tool
    pub jobs: usize,
    pub toolchain: Toolchain,
}

impl Default for ProcedureSettings {
    fn default() -> Self {
        Self {
            build_dir_name: "build".to_string(),
            jobs: 1,
            toolchain: Toolchain::standard(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStep {
    pub stage: StepStage,
    pub command: StepCommand,
}

impl BuildStep {
    fn new(stage: StepStage, command: StepCommand) -> Self {
        Self { stage, command }
    }
}

pub trait BuildProcedure: Send + Sync {
    fn kind(&self) -> BuildSystemKind;

    /// Directory created before the first step runs
    fn build_dir(&self, root: &Path, settings: &ProcedureSettings) -> PathBuf {
        root.join(&settings.build_dir_name)
    }

    /// Steps in execution order: configuration, build, testing
    fn steps(&self, root: &Path, settings: &ProcedureSettings) -> Vec<BuildStep>;
}

/// `meson setup <build>` from the root, then `ninja` and `ninja test` inside it.
///
/// The setup argument is the bare build directory name; meson resolves it
/// against the root.
pub struct MesonProcedure;

impl BuildProcedure for MesonProcedure {
    fn kind(&self) -> BuildSystemKind {
        BuildSystemKind::Meson
    }

    fn steps(&self, root: &Path, settings: &ProcedureSettings) -> Vec<BuildStep> {
        let build_dir = self.build_dir(root, settings);
        let tools = &settings.toolchain;

        vec![
            BuildStep::new(
                StepStage::Configuration,
                StepCommand::new(&tools.meson, root)
                    .arg("setup")
                    .arg(&settings.build_dir_name),
            ),
            BuildStep::new(StepStage::Build, StepCommand::new(&tools.ninja, &build_dir)),
            BuildStep::new(
                StepStage::Testing,
                StepCommand::new(&tools.ninja, &build_dir).arg("test"),
            ),
        ]
    }
}

/// `cmake ..`, `make -j N` and `make test`, all inside the build directory
pub struct CMakeProcedure;

impl BuildProcedure for CMakeProcedure {
    fn kind(&self) -> BuildSystemKind {
        BuildSystemKind::CMake
    }

    fn steps(&self, root: &Path, settings: &ProcedureSettings) -> Vec<BuildStep> {
        let build_dir = self.build_dir(root, settings);
        let tools = &settings.toolchain;

        vec![
            BuildStep::new(
                StepStage::Configuration,
                StepCommand::new(&tools.cmake, &build_dir).arg(".."),
            ),
            BuildStep::new(
                StepStage::Build,
                StepCommand::new(&tools.make, &build_dir)
                    .arg("-j")
                    .arg(settings.jobs.to_string()),
            ),
            BuildStep::new(
                StepStage::Testing,
                StepCommand::new(&tools.make, &build_dir).arg("test"),
            ),
        ]
    }
}

/// Procedures by kind
#[derive(Clone, Default)]
pub struct ProcedureRegistry {
    procedures: Vec<Arc<dyn BuildProcedure>>,
}

impl ProcedureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(MesonProcedure));
        registry.register(Arc::new(CMakeProcedure));
        registry
    }

    /// Registers a procedure, replacing any existing one for the same kind
    pub fn register(&mut self, procedure: Arc<dyn BuildProcedure>) {
        self.procedures.retain(|p| p.kind() != procedure.kind());
        self.procedures.push(procedure);
    }

    pub fn get(&self, kind: BuildSystemKind) -> Option<&dyn BuildProcedure> {
        self.procedures
            .iter()
            .find(|p| p.kind() == kind)
            .map(|p| p.as_ref())
    }

    pub fn supported_kinds(&self) -> Vec<BuildSystemKind> {
        self.procedures.iter().map(|p| p.kind()).collect()
    }
}
