use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use tracing::{debug, warn};

/// Exclusive hold on a repository working tree for the length of one build.
///
/// Dropping the guard deletes the whole tree, on every exit path. A tree
/// that is already gone is fine.
#[derive(Debug)]
pub struct WorkTree {
    root: PathBuf,
}

impl WorkTree {
    pub fn claim(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for WorkTree {
    fn drop(&mut self) {
        if !names_a_tree(&self.root) {
            warn!(root = %self.root.display(), "Refusing to remove path without a final name");
            return;
        }
        match fs::remove_dir_all(&self.root) {
            Ok(()) => debug!(root = %self.root.display(), "Removed working tree"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(root = %self.root.display(), "Working tree already absent")
            }
            Err(e) => warn!(
                root = %self.root.display(),
                error = %e,
                "Failed to remove working tree"
            ),
        }
    }
}

/// `ws/..`, `ws/.` and `/` resolve to a parent or the workspace itself.
/// `Path::file_name` hides a trailing `.`, so the raw last segment is checked.
fn names_a_tree(root: &Path) -> bool {
    let raw = root.to_string_lossy();
    let last = raw
        .trim_end_matches(MAIN_SEPARATOR)
        .rsplit(MAIN_SEPARATOR)
        .next()
        .unwrap_or("");
    !matches!(last, "" | "." | "..")
}
