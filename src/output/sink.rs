use super::record::AuditRecord;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to open results file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write results file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize record for {repo_url}: {source}")]
    Serialize {
        repo_url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Append-only JSON Lines results file.
///
/// Each record is flushed as soon as it is written, so an interrupted
/// batch leaves every finished repository on disk.
pub struct JsonlSink {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
}

impl JsonlSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| SinkError::Open {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(open_err)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(open_err)?;

        debug!(path = %path.display(), "Opened results file");
        Ok(Self {
            writer: BufWriter::new(file),
            path,
            written: 0,
        })
    }

    pub fn write(&mut self, record: &AuditRecord) -> Result<(), SinkError> {
        let line = serde_json::to_string(record).map_err(|source| SinkError::Serialize {
            repo_url: record.repo_url.clone(),
            source,
        })?;

        writeln!(self.writer, "{}", line)
            .and_then(|_| self.writer.flush())
            .map_err(|source| SinkError::Write {
                path: self.path.clone(),
                source,
            })?;

        self.written += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records written through this handle
    pub fn written(&self) -> usize {
        self.written
    }
}
