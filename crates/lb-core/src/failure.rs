//! Per-unit failure entries written to the run's failure artifact.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One failed unit of work. Append-only; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FailureEntry {
    /// Package name of the failed unit.
    pub package: String,
    /// Human-readable error description.
    pub error: String,
    /// Error category (`transport`, `upstream_status`, `no_version_info`, ...).
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    /// 1-based batch in which the unit ran.
    pub batch_number: usize,
}

impl FailureEntry {
    #[must_use]
    pub fn new(
        package: impl Into<String>,
        kind: impl Into<String>,
        error: impl Into<String>,
        batch_number: usize,
    ) -> Self {
        Self {
            package: package.into(),
            error: error.into(),
            kind: kind.into(),
            timestamp: Utc::now(),
            batch_number,
        }
    }
}
