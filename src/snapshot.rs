//! Snapshot rendering and persistence.
//!
//! Output format, one section per namespace in priority order:
//!
//! ```text
//! ##### common #####
//! timeout=30
//!
//! ##### app #####
//! db.host=x
//! db.port=5432
//! ```
//!
//! Keys are sorted within a section. Sections are separated by one blank
//! line. A namespace emptied by dedup still gets its header. Identical input
//! state always renders to identical bytes.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error};

use crate::merge::MergedSnapshot;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write snapshot to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Header line for a namespace section.
#[must_use]
pub fn section_header(namespace: &str) -> String {
    format!("##### {} #####", namespace)
}

/// Render the snapshot in the persisted text format.
#[must_use]
pub fn render(snapshot: &MergedSnapshot) -> String {
    let mut out = String::new();
    for (i, section) in snapshot.sections().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&section_header(&section.namespace));
        out.push('\n');
        for (key, value) in &section.entries {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
    }
    out
}

/// Writes rendered snapshots to a fixed path, replacing the file each time.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    path: PathBuf,
}

impl SnapshotWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory if needed, then overwrite the file.
    ///
    /// Returns the number of bytes written.
    pub async fn write(&self, snapshot: &MergedSnapshot) -> Result<usize, SnapshotError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|source| {
                error!(path = %parent.display(), error = %source, "Snapshot directory not creatable");
                crate::metrics::record_error("snapshot", "create_dir");
                SnapshotError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                }
            })?;
        }

        let contents = render(snapshot);
        tokio::fs::write(&self.path, contents.as_bytes()).await.map_err(|source| {
            error!(path = %self.path.display(), error = %source, "Snapshot write failed");
            crate::metrics::record_error("snapshot", "write");
            SnapshotError::Write {
                path: self.path.clone(),
                source,
            }
        })?;

        debug!(path = %self.path.display(), bytes = contents.len(), sections = snapshot.len(), "Snapshot written");
        crate::metrics::record_snapshot_write(contents.len());
        Ok(contents.len())
    }
}
