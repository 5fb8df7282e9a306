//! File-based data source.
//!
//! Reads `chronyc clients` output that was captured to a file, e.g. with
//! `sudo chronyc clients > clients.txt`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{ClientSource, InvocationError};

/// A data source that reads captured output from a text file.
///
/// The file is re-read on every fetch, so an external job can keep it
/// up to date while the dashboard runs.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    description: String,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self { path, description }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ClientSource for FileSource {
    async fn fetch(&self) -> Result<String, InvocationError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| InvocationError::Read {
                path: self.path.clone(),
                source: e,
            })?;
        debug!(path = %self.path.display(), bytes = text.len(), "read captured output");
        Ok(text)
    }

    fn description(&self) -> &str {
        &self.description
    }
}
