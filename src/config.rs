use std::env;
use std::fmt;
use std::path::{Component, Path};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 300;
const DEFAULT_MAX_PARALLEL_JOBS: usize = 4;
const DEFAULT_LOG_LIMIT: usize = 2000;
const DEFAULT_BUILD_DIR: &str = "build";
const DEFAULT_LOG_LEVEL: &str = "info";

const MAX_TIMEOUT_SECS: u64 = 86_400;
const MAX_PARALLEL_JOBS: usize = 256;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

/// External tools invoked during acquisition and builds.
///
/// Only the program names can be overridden; argument vectors are fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub git: String,
    pub meson: String,
    pub ninja: String,
    pub cmake: String,
    pub make: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            git: tool_from_env("BUILDSCOUT_GIT", "git"),
            meson: tool_from_env("BUILDSCOUT_MESON", "meson"),
            ninja: tool_from_env("BUILDSCOUT_NINJA", "ninja"),
            cmake: tool_from_env("BUILDSCOUT_CMAKE", "cmake"),
            make: tool_from_env("BUILDSCOUT_MAKE", "make"),
        }
    }
}

impl Toolchain {
    /// Plain tool names, ignoring the environment
    pub fn standard() -> Self {
        Self {
            git: "git".to_string(),
            meson: "meson".to_string(),
            ninja: "ninja".to_string(),
            cmake: "cmake".to_string(),
            make: "make".to_string(),
        }
    }

    fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("git", self.git.as_str()),
            ("meson", self.meson.as_str()),
            ("ninja", self.ninja.as_str()),
            ("cmake", self.cmake.as_str()),
            ("make", self.make.as_str()),
        ]
    }
}

fn tool_from_env(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::ParseError {
            field: key.to_string(),
            error: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Applies to the clone and to every build step individually
    pub timeout_secs: u64,
    /// Upper bound for `make -j`; further capped by available CPUs
    pub max_parallel_jobs: usize,
    /// Characters kept from each log field of a result record
    pub log_limit: usize,
    pub build_dir_name: String,
    pub log_level: String,
    pub toolchain: Toolchain,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_parallel_jobs: DEFAULT_MAX_PARALLEL_JOBS,
            log_limit: DEFAULT_LOG_LIMIT,
            build_dir_name: DEFAULT_BUILD_DIR.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            toolchain: Toolchain::standard(),
        }
    }
}

impl AuditConfig {
    /// Defaults overridden by `BUILDSCOUT_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            timeout_secs: parse_env("BUILDSCOUT_TIMEOUT", DEFAULT_TIMEOUT_SECS)?,
            max_parallel_jobs: parse_env("BUILDSCOUT_MAX_JOBS", DEFAULT_MAX_PARALLEL_JOBS)?,
            log_limit: parse_env("BUILDSCOUT_LOG_LIMIT", DEFAULT_LOG_LIMIT)?,
            build_dir_name: env::var("BUILDSCOUT_BUILD_DIR")
                .unwrap_or_else(|_| DEFAULT_BUILD_DIR.to_string()),
            log_level: env::var("BUILDSCOUT_LOG_LEVEL")
                .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
                .to_lowercase(),
            toolchain: Toolchain::default(),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Timeout must be at least 1 second".to_string(),
            ));
        }
        if self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(
                "Timeout cannot exceed 24 hours".to_string(),
            ));
        }

        if self.max_parallel_jobs == 0 || self.max_parallel_jobs > MAX_PARALLEL_JOBS {
            return Err(ConfigError::ValidationFailed(format!(
                "Max parallel jobs must be between 1 and {}",
                MAX_PARALLEL_JOBS
            )));
        }

        if self.log_limit == 0 {
            return Err(ConfigError::ValidationFailed(
                "Log limit must be at least 1 character".to_string(),
            ));
        }

        let mut components = Path::new(&self.build_dir_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Build directory must be a single relative path component, got '{}'",
                    self.build_dir_name
                )))
            }
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        for (tool, program) in self.toolchain.entries() {
            if program.trim().is_empty() {
                return Err(ConfigError::ValidationFailed(format!(
                    "Tool '{}' must not be empty",
                    tool
                )));
            }
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// `min(max_parallel_jobs, available CPUs)`, at least 1
    pub fn effective_jobs(&self) -> usize {
        let cpus = std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1);
        self.max_parallel_jobs.min(cpus).max(1)
    }
}

impl fmt::Display for AuditConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Buildscout Configuration:")?;
        writeln!(f, "  Timeout: {}s", self.timeout_secs)?;
        writeln!(f, "  Max Parallel Jobs: {}", self.max_parallel_jobs)?;
        writeln!(f, "  Log Limit: {} chars", self.log_limit)?;
        writeln!(f, "  Build Dir: {}", self.build_dir_name)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        for (tool, program) in self.toolchain.entries() {
            writeln!(f, "  Tool {}: {}", tool, program)?;
        }
        Ok(())
    }
}
