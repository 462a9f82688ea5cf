//! Staged build orchestration
//!
//! - [`procedure`]: per-kind configure/build/test steps
//! - [`runner`]: timeout-bounded subprocess execution
//! - [`orchestrator`]: runs the steps, attributes failures, cleans up
//! - [`worktree`]: guaranteed deletion of the repository tree

pub mod orchestrator;
pub mod outcome;
pub mod procedure;
pub mod runner;
pub mod stage;
pub mod worktree;

pub use orchestrator::{BuildOrchestrator, BuildSettings};
pub use outcome::{BuildOutcome, BuildStatus};
pub use procedure::{
    BuildProcedure, BuildStep, CMakeProcedure, MesonProcedure, ProcedureRegistry,
    ProcedureSettings,
};
pub use runner::{CommandRunner, ProcessRunner, StepCommand, StepOutput, Termination};
pub use stage::{PipelineStage, StepStage};
pub use worktree::WorkTree;
