//! buildscout - fleet-wide buildability audit
//!
//! Takes a list of repository URLs and, for each one, clones it, classifies
//! its build system from root-level marker files and, for supported kinds,
//! runs a configure, build and test cycle. Every repository yields exactly
//! one JSON record in an append-only results file, and every cloned tree is
//! deleted once its build attempt ends.
//!
//! # Example Usage
//!
//! ```no_run
//! use buildscout::{AuditConfig, BatchDriver, JsonlSink, ProcessRunner};
//! use std::sync::Arc;
//!
//! # async fn audit() -> anyhow::Result<()> {
//! let config = AuditConfig::from_env()?;
//! config.validate()?;
//!
//! let driver = BatchDriver::new(&config, "workspace", Arc::new(ProcessRunner::new()));
//! let mut sink = JsonlSink::open("results/results.jsonl")?;
//!
//! let urls = vec!["https://github.com/madler/zlib.git".to_string()];
//! let summary = driver.run(&urls, &mut sink).await?;
//! println!("{} built OK", summary.built_ok);
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`detection`]: ordered marker signatures and the detector
//! - [`build`]: per-kind procedures, subprocess runner, orchestrator
//! - [`acquire`]: shallow git clones into the workspace
//! - [`driver`]: sequential batch processing
//! - [`output`]: result records and the JSON Lines sink

pub mod acquire;
pub mod build;
pub mod cli;
pub mod config;
pub mod detection;
pub mod driver;
pub mod fs;
pub mod input;
pub mod output;
pub mod progress;
pub mod util;

pub use acquire::{repo_name_from_url, Acquisition, CloneStatus, RepoFetcher};
pub use build::{
    BuildOrchestrator, BuildOutcome, BuildSettings, BuildStatus, CommandRunner, PipelineStage,
    ProcessRunner,
};
pub use config::{AuditConfig, ConfigError, Toolchain};
pub use detection::{BuildSystemDetector, BuildSystemKind, Detection};
pub use driver::{BatchDriver, BatchSummary};
pub use input::{read_repo_urls, InputError};
pub use output::{truncate_log, AuditRecord, JsonlSink, SinkError};
pub use util::{init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
