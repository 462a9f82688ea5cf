use super::rules::SIGNATURES;
use super::BuildSystemKind;
use crate::fs::{FileSystem, RealFileSystem};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Classification of one repository plus the markers that justified it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub kind: BuildSystemKind,
    /// Marker names in rule-check order; empty only for `OTHER`
    pub evidence: Vec<String>,
}

impl Detection {
    pub fn other() -> Self {
        Self {
            kind: BuildSystemKind::Other,
            evidence: Vec::new(),
        }
    }
}

/// Classifies a repository root by the first matching signature.
///
/// Read-only: never mutates the tree or spawns processes, and never fails.
/// A root without any recognized marker (or one that cannot be listed) is
/// classified as `OTHER`.
pub struct BuildSystemDetector {
    fs: Arc<dyn FileSystem>,
}

impl BuildSystemDetector {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    pub fn detect(&self, root: &Path) -> Detection {
        for signature in SIGNATURES {
            if let Some(evidence) = signature.evaluate(root, self.fs.as_ref()) {
                debug!(
                    root = %root.display(),
                    kind = %signature.kind,
                    evidence = ?evidence,
                    "Build system detected"
                );
                return Detection {
                    kind: signature.kind,
                    evidence,
                };
            }
        }

        debug!(root = %root.display(), "No build system marker found");
        Detection::other()
    }
}

impl Default for BuildSystemDetector {
    fn default() -> Self {
        Self::new(Arc::new(RealFileSystem::new()))
    }
}
