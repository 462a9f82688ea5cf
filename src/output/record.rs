use crate::acquire::{repo_name_from_url, Acquisition, CloneStatus};
use crate::build::{BuildOutcome, BuildStatus, PipelineStage};
use crate::detection::{BuildSystemKind, Detection};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

pub const DEFAULT_LOG_LIMIT: usize = 2000;

fn serialize_rfc3339<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// One line of the results file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    #[serde(serialize_with = "serialize_rfc3339")]
    pub timestamp: DateTime<Utc>,
    pub repo_url: String,
    pub repo_name: String,
    pub clone_status: CloneStatus,
    pub clone_log: String,
    pub build_type: BuildSystemKind,
    pub evidence: Vec<String>,
    pub build_status: BuildStatus,
    pub build_log: String,
    pub failure_stage: PipelineStage,
}

impl AuditRecord {
    /// Record for a repository whose acquisition failed; nothing else ran.
    pub fn acquisition_failed(url: &str, acquisition: &Acquisition, log_limit: usize) -> Self {
        Self {
            timestamp: Utc::now(),
            repo_url: url.to_string(),
            repo_name: repo_name_from_url(url),
            clone_status: acquisition.status,
            clone_log: truncate_log(&acquisition.log, log_limit),
            build_type: BuildSystemKind::Other,
            evidence: Vec::new(),
            build_status: BuildStatus::Pending,
            build_log: String::new(),
            failure_stage: PipelineStage::Unknown,
        }
    }

    pub fn built(
        url: &str,
        acquisition: &Acquisition,
        detection: Detection,
        outcome: &BuildOutcome,
        log_limit: usize,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            repo_url: url.to_string(),
            repo_name: repo_name_from_url(url),
            clone_status: acquisition.status,
            clone_log: truncate_log(&acquisition.log, log_limit),
            build_type: detection.kind,
            evidence: detection.evidence,
            build_status: outcome.status(),
            build_log: truncate_log(outcome.log(), log_limit),
            failure_stage: outcome.stage(),
        }
    }

    pub fn is_build_ok(&self) -> bool {
        self.build_status == BuildStatus::Ok
    }
}

/// First `limit` characters of `log`; shorter logs are returned unchanged.
pub fn truncate_log(log: &str, limit: usize) -> String {
    match log.char_indices().nth(limit) {
        Some((cut, _)) => log[..cut].to_string(),
        None => log.to_string(),
    }
}
