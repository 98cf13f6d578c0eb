//! Run-scoped failure collection and the end-of-run artifact.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use lb_core::enums::RunMode;
use lb_core::failure::FailureEntry;

use crate::error::EnrichError;

/// Append-only list of the run's failed units.
#[derive(Debug, Default)]
pub struct FailureSink {
    entries: Vec<FailureEntry>,
}

impl FailureSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: FailureEntry) {
        self.entries.push(entry);
    }

    /// Append a finished batch's failures.
    pub fn merge(&mut self, entries: Vec<FailureEntry>) {
        self.entries.extend(entries);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[FailureEntry] {
        &self.entries
    }

    /// Write every entry as one pretty JSON array to
    /// `<dir>/failed_<mode>_<YYYYmmdd_HHMMSS>.json`.
    ///
    /// Writes nothing and returns `None` when the run had no failures. An
    /// existing artifact is never overwritten: a second run in the same
    /// second gets a `_2` (then `_3`, ...) suffix.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Artifact`] if the directory or file cannot be
    /// written.
    pub fn persist(
        &self,
        dir: &Path,
        mode: RunMode,
        at: DateTime<Utc>,
    ) -> Result<Option<PathBuf>, EnrichError> {
        if self.entries.is_empty() {
            return Ok(None);
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::create_dir_all(dir).map_err(|source| EnrichError::Artifact {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut sequence = 1;
        let (path, mut file) = loop {
            let path = dir.join(artifact_name(mode, at, sequence));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => sequence += 1,
                Err(source) => return Err(EnrichError::Artifact { path, source }),
            }
        };
        file.write_all(json.as_bytes())
            .map_err(|source| EnrichError::Artifact {
                path: path.clone(),
                source,
            })?;
        tracing::info!(path = %path.display(), failures = self.entries.len(), "failure artifact written");
        Ok(Some(path))
    }
}

fn artifact_name(mode: RunMode, at: DateTime<Utc>, sequence: u32) -> String {
    let stamp = at.format("%Y%m%d_%H%M%S");
    if sequence > 1 {
        format!("failed_{mode}_{stamp}_{sequence}.json")
    } else {
        format!("failed_{mode}_{stamp}.json")
    }
}
