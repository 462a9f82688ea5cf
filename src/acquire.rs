//! Repository acquisition: shallow git clones into a shared workspace

use crate::build::runner::{CommandRunner, StepCommand};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

crate::define_label_enum! {
    /// `clone_status` of a result record
    CloneStatus {
        Ok => "OK",
        Fail => "FAIL",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    pub status: CloneStatus,
    /// Working tree location; only set when the status is `OK`
    pub path: Option<PathBuf>,
    pub log: String,
}

impl Acquisition {
    fn ok(path: PathBuf, log: impl Into<String>) -> Self {
        Self {
            status: CloneStatus::Ok,
            path: Some(path),
            log: log.into(),
        }
    }

    fn failed(log: impl Into<String>) -> Self {
        Self {
            status: CloneStatus::Fail,
            path: None,
            log: log.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == CloneStatus::Ok
    }
}

pub const UNKNOWN_REPO: &str = "unknown_repo";

/// Directory name for a repository URL: the last path segment without a
/// trailing `.git`. Anything that is not a single plain path component
/// (empty, `.`, `..`) becomes `unknown_repo`.
pub fn repo_name_from_url(url: &str) -> String {
    let last = url.trim().trim_end_matches('/').rsplit('/').next().unwrap_or("");
    let name = last.strip_suffix(".git").unwrap_or(last);
    if is_plain_component(name) {
        name.to_string()
    } else {
        UNKNOWN_REPO.to_string()
    }
}

fn is_plain_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Clones repositories into `<workspace>/<repo_name>`.
///
/// An existing target directory counts as already acquired and is returned
/// as is, without running git.
pub struct RepoFetcher {
    runner: Arc<dyn CommandRunner>,
    workspace: PathBuf,
    git: String,
    timeout: Duration,
}

impl RepoFetcher {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        workspace: impl Into<PathBuf>,
        git: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            runner,
            workspace: workspace.into(),
            git: git.into(),
            timeout,
        }
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn target_dir(&self, url: &str) -> PathBuf {
        self.workspace.join(repo_name_from_url(url))
    }

    pub async fn acquire(&self, url: &str) -> Acquisition {
        if let Err(e) = tokio::fs::create_dir_all(&self.workspace).await {
            warn!(workspace = %self.workspace.display(), error = %e, "Cannot create workspace");
            return Acquisition::failed(format!(
                "Failed to create workspace {}: {}",
                self.workspace.display(),
                e
            ));
        }

        let repo_name = repo_name_from_url(url);
        if !is_plain_component(&repo_name) {
            return Acquisition::failed(format!("Refusing target outside workspace: {}", repo_name));
        }
        let target = self.workspace.join(&repo_name);

        if target.exists() {
            debug!(repo = %url, target = %target.display(), "Target exists, skipping clone");
            return Acquisition::ok(
                target.clone(),
                format!("SKIP: already exists: {}", target.display()),
            );
        }

        let command = StepCommand::new(&self.git, &self.workspace)
            .arg("clone")
            .arg("--depth")
            .arg("1")
            .arg("--single-branch")
            .arg(url)
            .arg(&repo_name);

        info!(repo = %url, target = %target.display(), "Cloning repository");
        let output = self.runner.run(&command, self.timeout).await;

        if output.passed() {
            Acquisition::ok(target, output.log)
        } else {
            warn!(repo = %url, termination = ?output.termination, "Clone failed");
            // An interrupted clone must not be mistaken for a finished one later.
            if target.exists() {
                if let Err(e) = tokio::fs::remove_dir_all(&target).await {
                    warn!(target = %target.display(), error = %e, "Failed to remove partial clone");
                }
            }
            Acquisition::failed(output.log)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::runner::{MockCommandRunner, StepOutput, Termination};
    use tempfile::TempDir;
    use yare::parameterized;

    #[parameterized(
        https_with_git = { "https://github.com/madler/zlib.git", "zlib" },
        https_plain = { "https://gitlab.gnome.org/GNOME/glib", "glib" },
        trailing_slash = { "https://github.com/user/repo/", "repo" },
        scp_style = { "git@github.com:user/libpng.git", "libpng" },
        surrounding_whitespace = { "  https://example.org/a/b.git  ", "b" },
        only_suffix = { "https://example.org/.git", "unknown_repo" },
        empty = { "", "unknown_repo" },
        parent_segment = { "https://example.org/group/..", "unknown_repo" },
        current_segment = { "https://example.org/group/.", "unknown_repo" },
        parent_with_suffix = { "https://example.org/group/..git", "unknown_repo" },
        dots_inside_name = { "https://example.org/group/lib..x.git", "lib..x" },
    )]
    fn test_repo_name_from_url(url: &str, expected: &str) {
        assert_eq!(repo_name_from_url(url), expected);
    }

    #[tokio::test]
    async fn test_clone_command_and_success() {
        let temp = TempDir::new().unwrap();
        let workspace = temp.path().join("ws");
        let expected_cwd = workspace.clone();

        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(move |command, timeout| {
                command.program == "git"
                    && command.args
                        == vec![
                            "clone",
                            "--depth",
                            "1",
                            "--single-branch",
                            "https://github.com/madler/zlib.git",
                            "zlib",
                        ]
                    && command.cwd == expected_cwd
                    && *timeout == Duration::from_secs(30)
            })
            .times(1)
            .returning(|_, _| StepOutput::exited(0, "Cloning into 'zlib'..."));

        let fetcher = RepoFetcher::new(Arc::new(runner), &workspace, "git", Duration::from_secs(30));
        let acquisition = fetcher.acquire("https://github.com/madler/zlib.git").await;

        assert!(acquisition.is_ok());
        assert_eq!(acquisition.path, Some(workspace.join("zlib")));
        assert_eq!(acquisition.log, "Cloning into 'zlib'...");
        assert!(workspace.is_dir());
    }

    #[tokio::test]
    async fn test_dot_segments_stay_inside_workspace() {
        let temp = TempDir::new().unwrap();
        let workspace = temp.path().join("ws");

        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(2).returning(|command, _| {
            assert_eq!(command.args[5], "unknown_repo");
            StepOutput::exited(128, "fatal: not a repository")
        });

        let fetcher = RepoFetcher::new(Arc::new(runner), &workspace, "git", Duration::from_secs(5));
        for url in ["https://example.org/group/..", "https://example.org/group/."] {
            let acquisition = fetcher.acquire(url).await;
            assert_eq!(acquisition.status, CloneStatus::Fail);
            assert!(!acquisition.log.starts_with("SKIP"));
        }
    }

    #[tokio::test]
    async fn test_second_acquire_skips_fetch() {
        let temp = TempDir::new().unwrap();
        let workspace = temp.path().to_path_buf();

        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(1).returning(|command, _| {
            std::fs::create_dir_all(command.cwd.join(&command.args[5])).unwrap();
            StepOutput::exited(0, "cloned")
        });

        let fetcher = RepoFetcher::new(Arc::new(runner), &workspace, "git", Duration::from_secs(5));
        let url = "https://github.com/user/demo.git";

        let first = fetcher.acquire(url).await;
        let second = fetcher.acquire(url).await;

        assert_eq!(first.status, CloneStatus::Ok);
        assert_eq!(second.status, CloneStatus::Ok);
        assert_eq!(first.path, second.path);
        assert!(second.log.starts_with("SKIP: already exists:"));
    }

    #[tokio::test]
    async fn test_failed_clone_reports_log() {
        let temp = TempDir::new().unwrap();

        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .times(1)
            .returning(|_, _| StepOutput::exited(128, "fatal: repository not found"));

        let fetcher = RepoFetcher::new(Arc::new(runner), temp.path(), "git", Duration::from_secs(5));
        let acquisition = fetcher.acquire("https://example.org/missing.git").await;

        assert_eq!(acquisition.status, CloneStatus::Fail);
        assert!(acquisition.path.is_none());
        assert_eq!(acquisition.log, "fatal: repository not found");
    }

    #[tokio::test]
    async fn test_timed_out_clone_removes_partial_tree() {
        let temp = TempDir::new().unwrap();
        let workspace = temp.path().to_path_buf();

        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(1).returning(|command, _| {
            std::fs::create_dir_all(command.cwd.join("slow/.git")).unwrap();
            StepOutput {
                termination: Termination::TimedOut,
                log: "TIMEOUT after 5s".to_string(),
                duration_ms: 5000,
            }
        });

        let fetcher = RepoFetcher::new(Arc::new(runner), &workspace, "git", Duration::from_secs(5));
        let acquisition = fetcher.acquire("https://example.org/slow.git").await;

        assert_eq!(acquisition.status, CloneStatus::Fail);
        assert_eq!(acquisition.log, "TIMEOUT after 5s");
        assert!(!workspace.join("slow").exists());
    }
}
