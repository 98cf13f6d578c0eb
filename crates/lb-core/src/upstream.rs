//! Typed results of the three per-package upstream fetches.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// What the registry reports about a package's latest version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryMetadata {
    /// Version resolved from the `latest` dist-tag.
    pub latest_version: String,
    pub description: String,
    /// Dependency names of the latest version, sorted.
    pub dependencies: Vec<String>,
    /// Peer dependency names of the latest version, sorted.
    pub peer_dependencies: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
}

/// Aggregate stats from the ecosystem source. Missing values are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcosystemStats {
    pub total_downloads: u64,
    pub dependent_packages_count: u64,
    pub dependent_repos_count: u64,
}

/// One entry of the daily download series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyDownloads {
    pub day: NaiveDate,
    pub downloads: u64,
}
