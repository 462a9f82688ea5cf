//! Repository list input

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const URL_COLUMN: &str = "repo_url";

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Input file not found: {0}")]
    NotFound(PathBuf),

    #[error("Input file {path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Reads repository URLs from the `repo_url` column of a CSV file with a
/// header row. Values are trimmed; empty ones are skipped.
pub fn read_repo_urls(path: &Path) -> Result<Vec<String>, InputError> {
    if !path.is_file() {
        return Err(InputError::NotFound(path.to_path_buf()));
    }

    let csv_err = |source| InputError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let column = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .position(|h| h.trim() == URL_COLUMN)
        .ok_or_else(|| InputError::MissingColumn {
            path: path.to_path_buf(),
            column: URL_COLUMN.to_string(),
        })?;

    let mut urls = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        match record.get(column).map(str::trim) {
            Some(url) if !url.is_empty() => urls.push(url.to_string()),
            _ => debug!(line = record.position().map(|p| p.line()), "Skipping row without URL"),
        }
    }

    debug!(path = %path.display(), count = urls.len(), "Loaded repository list");
    Ok(urls)
}
