//! Pipeline error types.
//!
//! [`UnitError`] is caught at the unit boundary and turned into a failure
//! entry. [`EnrichError`] ends the run.

use std::path::PathBuf;
use std::time::Duration;

use lb_db::error::DatabaseError;
use lb_registry::RegistryError;
use thiserror::Error;

/// Why one package's enrichment failed.
#[derive(Debug, Error)]
pub enum UnitError {
    /// One of the three fetches failed after its retries.
    #[error(transparent)]
    Upstream(#[from] RegistryError),

    /// The fetches did not finish within the unit budget.
    #[error("timed out after {}s", budget.as_secs())]
    Timeout { budget: Duration },

    /// The enriched record could not be written.
    #[error("store write failed: {0}")]
    Store(#[from] DatabaseError),
}

impl UnitError {
    /// Category label recorded in the failure artifact.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Upstream(e) => e.kind(),
            Self::Timeout { .. } => "timeout",
            Self::Store(_) => "store",
        }
    }
}

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// The input set could not be read from the store.
    #[error("failed to load input set: {0}")]
    InputSet(#[from] DatabaseError),

    /// The failure artifact could not be written.
    #[error("failed to write failure artifact {path}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize failure artifact: {0}")]
    Serialize(#[from] serde_json::Error),
}
