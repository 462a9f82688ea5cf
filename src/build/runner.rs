//! Timeout-bounded execution of external tools.

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

/// A single external tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl StepCommand {
    pub fn new(program: impl Into<String>, cwd: impl AsRef<Path>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.as_ref().to_path_buf(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for StepCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// How a step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The process exited; `code` is `None` when it was killed by a signal
    Exited { code: Option<i32> },
    /// The timeout elapsed and the process was killed
    TimedOut,
    /// The program could not be started at all
    SpawnFailed,
}

/// Outcome of a step: termination plus stdout and stderr merged in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutput {
    pub termination: Termination,
    pub log: String,
    pub duration_ms: u64,
}

impl StepOutput {
    pub fn exited(code: i32, log: impl Into<String>) -> Self {
        Self {
            termination: Termination::Exited { code: Some(code) },
            log: log.into(),
            duration_ms: 0,
        }
    }

    /// Exit code 0 is the only success
    pub fn passed(&self) -> bool {
        self.termination == Termination::Exited { code: Some(0) }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self.termination {
            Termination::Exited { code } => code,
            _ => None,
        }
    }
}

/// Runs step commands. The orchestrator and the fetcher only talk to this
/// trait so that tests can script exit codes and count spawns.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &StepCommand, timeout: Duration) -> StepOutput;
}

/// Bytes of merged output kept per step unless configured otherwise
pub const DEFAULT_CAPTURE_LIMIT: usize = 1024 * 1024;

/// [`CommandRunner`] backed by real child processes.
///
/// Each step runs in its own process group so that a timeout takes down the
/// tools it spawned as well. Only the first `capture_limit` bytes of output
/// are kept; the rest is read and discarded.
#[derive(Debug, Clone, Copy)]
pub struct ProcessRunner {
    capture_limit: usize,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self {
            capture_limit: DEFAULT_CAPTURE_LIMIT,
        }
    }
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capture_limit(mut self, bytes: usize) -> Self {
        self.capture_limit = bytes;
        self
    }

    pub fn capture_limit(&self) -> usize {
        self.capture_limit
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &StepCommand, timeout: Duration) -> StepOutput {
        let start = Instant::now();
        debug!(command = %command, cwd = %command.cwd.display(), "Spawning step");

        let mut process = Command::new(&command.program);
        process
            .args(&command.args)
            .current_dir(&command.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        process.process_group(0);

        let mut child = match process.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(program = %command.program, error = %e, "Failed to spawn step");
                return StepOutput {
                    termination: Termination::SpawnFailed,
                    log: format!("Failed to spawn `{}`: {}", command.program, e),
                    duration_ms: start.elapsed().as_millis() as u64,
                };
            }
        };

        let pid = child.id();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let mut captured = Vec::new();

        let waited = tokio::time::timeout(timeout, async {
            drain_merged(stdout, stderr, &mut captured, self.capture_limit).await;
            child.wait().await
        })
        .await;

        let (termination, log) = match waited {
            Ok(Ok(status)) => (
                Termination::Exited {
                    code: status.code(),
                },
                String::from_utf8_lossy(&captured).to_string(),
            ),
            Ok(Err(e)) => (
                Termination::Exited { code: None },
                format!(
                    "{}\nFailed to wait for `{}`: {}",
                    String::from_utf8_lossy(&captured),
                    command.program,
                    e
                ),
            ),
            Err(_) => {
                if let Some(pid) = pid {
                    kill_process_group(pid);
                }
                if let Err(e) = child.kill().await {
                    warn!(program = %command.program, error = %e, "Failed to kill timed out step");
                }
                let mut log = format!("TIMEOUT after {}s", timeout.as_secs());
                if !captured.is_empty() {
                    log.push('\n');
                    log.push_str(&String::from_utf8_lossy(&captured));
                }
                (Termination::TimedOut, log)
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        debug!(command = %command, ?termination, duration_ms, "Step finished");

        StepOutput {
            termination,
            log,
            duration_ms,
        }
    }
}

/// SIGKILL to every process in the group led by `pid`
#[cfg(unix)]
fn kill_process_group(pid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // SAFETY: kill(2) takes plain integers and touches no memory of ours.
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc != 0 {
        debug!(pgid, error = %std::io::Error::last_os_error(), "Process group already gone");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}

enum Chunk {
    Stdout(usize),
    Stderr(usize),
}

/// Reads both pipes until EOF, appending chunks to `log` as they arrive.
/// `log` stops growing at `limit` bytes; the pipes are still drained so the
/// child never blocks on a full pipe.
async fn drain_merged<O, E>(
    mut stdout: Option<O>,
    mut stderr: Option<E>,
    log: &mut Vec<u8>,
    limit: usize,
) where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut out_buf = [0u8; 8192];
    let mut err_buf = [0u8; 8192];

    loop {
        let chunk = match (stdout.as_mut(), stderr.as_mut()) {
            (None, None) => break,
            (Some(out), None) => Chunk::Stdout(out.read(&mut out_buf).await.unwrap_or(0)),
            (None, Some(err)) => Chunk::Stderr(err.read(&mut err_buf).await.unwrap_or(0)),
            (Some(out), Some(err)) => tokio::select! {
                n = out.read(&mut out_buf) => Chunk::Stdout(n.unwrap_or(0)),
                n = err.read(&mut err_buf) => Chunk::Stderr(n.unwrap_or(0)),
            },
        };

        let bytes = match chunk {
            Chunk::Stdout(0) => {
                stdout = None;
                continue;
            }
            Chunk::Stderr(0) => {
                stderr = None;
                continue;
            }
            Chunk::Stdout(n) => &out_buf[..n],
            Chunk::Stderr(n) => &err_buf[..n],
        };
        let room = limit.saturating_sub(log.len());
        log.extend_from_slice(&bytes[..bytes.len().min(room)]);
    }
}
