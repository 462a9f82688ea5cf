//! Subcommand handlers. Each returns the process exit code: 0 on success,
//! 1 on a fatal error. Per-repository failures are not fatal.

use super::commands::{DetectArgs, RunArgs};
use super::output::{format_summary, ConsoleProgressHandler, OutputFormatter};
use crate::build::ProcessRunner;
use crate::config::AuditConfig;
use crate::detection::BuildSystemDetector;
use crate::driver::{BatchDriver, BatchSummary};
use crate::input::read_repo_urls;
use crate::output::JsonlSink;
use anyhow::{bail, Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

pub async fn handle_run(args: &RunArgs) -> i32 {
    match run_batch(args).await {
        Ok(summary) => {
            println!("{}", format_summary(&summary, &args.out));
            0
        }
        Err(e) => {
            error!("{:#}", e);
            1
        }
    }
}

/// Environment defaults overridden by command-line flags, validated
pub fn resolve_config(args: &RunArgs) -> Result<AuditConfig> {
    let mut config = AuditConfig::from_env().context("Invalid environment configuration")?;
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(jobs) = args.jobs {
        config.max_parallel_jobs = jobs;
    }
    config.validate()?;
    Ok(config)
}

async fn run_batch(args: &RunArgs) -> Result<BatchSummary> {
    let config = resolve_config(args)?;
    debug!("Configuration: {}", config);

    let urls = read_repo_urls(&args.csv)?;
    info!(count = urls.len(), csv = %args.csv.display(), "Loaded repository list");

    let mut sink = JsonlSink::open(&args.out)?;

    let workspace = absolute_workspace(&args.workspace)?;
    debug!(workspace = %workspace.display(), "Using workspace");

    let runner = ProcessRunner::new().with_capture_limit(config.log_limit.saturating_mul(4));
    let driver = BatchDriver::new(&config, workspace, Arc::new(runner))
        .with_progress(Arc::new(ConsoleProgressHandler));

    let summary = driver.run(&urls, &mut sink).await?;
    Ok(summary)
}

/// Relative workspaces are anchored at the current directory
fn absolute_workspace(workspace: &Path) -> Result<PathBuf> {
    if workspace.is_absolute() {
        return Ok(workspace.to_path_buf());
    }
    let cwd = env::current_dir().context("Failed to get current directory")?;
    Ok(cwd.join(workspace))
}

pub fn handle_detect(args: &DetectArgs) -> i32 {
    match detect(args) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("{:#}", e);
            1
        }
    }
}

fn detect(args: &DetectArgs) -> Result<String> {
    let repo_path = match &args.repository_path {
        Some(path) => path.clone(),
        None => env::current_dir().context("Failed to get current directory")?,
    };

    if !repo_path.is_dir() {
        bail!("Repository path is not a directory: {}", repo_path.display());
    }

    let repo_path: PathBuf = repo_path
        .canonicalize()
        .with_context(|| format!("Failed to canonicalize {}", repo_path.display()))?;
    debug!("Repository path: {}", repo_path.display());

    let detection = BuildSystemDetector::default().detect(&repo_path);
    OutputFormatter::new(args.format.into()).format(&repo_path, &detection)
}
