use super::stage::{PipelineStage, StepStage};
use crate::detection::BuildSystemKind;
use serde::Serialize;

crate::define_label_enum! {
    /// `build_status` of a result record
    BuildStatus {
        /// The build was never attempted (acquisition failed)
        Pending => "PENDING",
        Ok => "OK",
        Fail => "FAIL",
    }
}

/// Result of one orchestrator run.
///
/// Only the constructors below create outcomes, which keeps status and
/// stage consistent: `OK` always pairs with `NONE`, and `FAIL` with one of
/// `CONFIGURATION`, `BUILD`, `TESTING` or `UNKNOWN`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOutcome {
    status: BuildStatus,
    log: String,
    stage: PipelineStage,
}

impl BuildOutcome {
    pub fn succeeded(log: impl Into<String>) -> Self {
        Self {
            status: BuildStatus::Ok,
            log: log.into(),
            stage: PipelineStage::None,
        }
    }

    pub fn failed(stage: StepStage, log: impl Into<String>) -> Self {
        Self {
            status: BuildStatus::Fail,
            log: log.into(),
            stage: stage.into(),
        }
    }

    pub fn unsupported(kind: BuildSystemKind) -> Self {
        Self {
            status: BuildStatus::Fail,
            log: format!("Unsupported build type: {}", kind),
            stage: PipelineStage::Unknown,
        }
    }

    pub fn status(&self) -> BuildStatus {
        self.status
    }

    pub fn log(&self) -> &str {
        &self.log
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn is_success(&self) -> bool {
        self.status == BuildStatus::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_succeeded_pairs_ok_with_none() {
        let outcome = BuildOutcome::succeeded("100% tests passed");
        assert_eq!(outcome.status(), BuildStatus::Ok);
        assert_eq!(outcome.stage(), PipelineStage::None);
        assert!(outcome.is_success());
    }

    #[test]
    fn test_failed_keeps_stage() {
        let outcome = BuildOutcome::failed(StepStage::Build, "error: undefined reference");
        assert_eq!(outcome.status(), BuildStatus::Fail);
        assert_eq!(outcome.stage(), PipelineStage::Build);
        assert_eq!(outcome.log(), "error: undefined reference");
    }

    #[test]
    fn test_unsupported_is_unknown_stage() {
        let outcome = BuildOutcome::unsupported(BuildSystemKind::Python);
        assert_eq!(outcome.status(), BuildStatus::Fail);
        assert_eq!(outcome.stage(), PipelineStage::Unknown);
        assert_eq!(outcome.log(), "Unsupported build type: PYTHON");
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(BuildOutcome::failed(StepStage::Testing, "1 test failed")).unwrap();
        assert_eq!(json["status"], "FAIL");
        assert_eq!(json["stage"], "TESTING");
    }
}
