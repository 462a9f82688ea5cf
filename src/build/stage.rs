//! Pipeline stages and the stage a build step belongs to

crate::define_label_enum! {
    /// Where a build pipeline stopped, as recorded in `failure_stage`
    PipelineStage {
        Configuration => "CONFIGURATION",
        Build => "BUILD",
        Testing => "TESTING",
        /// Every step succeeded
        None => "NONE",
        /// No procedure exists for the kind; the pipeline never started
        Unknown => "UNKNOWN",
    }
}

/// Stage of a single executable step. A subset of [`PipelineStage`] so that
/// a failed step can only ever be attributed to a real stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepStage {
    Configuration,
    Build,
    Testing,
}

impl From<StepStage> for PipelineStage {
    fn from(stage: StepStage) -> Self {
        match stage {
            StepStage::Configuration => PipelineStage::Configuration,
            StepStage::Build => PipelineStage::Build,
            StepStage::Testing => PipelineStage::Testing,
        }
    }
}

impl std::fmt::Display for StepStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", PipelineStage::from(*self))
    }
}
