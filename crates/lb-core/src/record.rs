//! The enriched package document persisted per package name.

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Downloads for one completed Monday-to-Sunday week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WeeklyTrend {
    /// The Sunday closing the week.
    pub week_ending: NaiveDate,
    pub downloads: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Downloads {
    /// Aggregate counter reported by the ecosystem stats source.
    pub total: u64,
    /// Completed weeks in the observation window, oldest first.
    pub weekly_trends: Vec<WeeklyTrend>,
}

/// Registry lifecycle timestamps. Absent when the registry does not report them.
///
/// `None` serializes as `null`, which the store's merge update treats as
/// "remove the key", so a stored document never carries a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NpmTimestamps {
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

/// Fields overwritten on every refresh. `name` and `created_time` are not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RecordFields {
    pub description: String,
    pub link: String,
    pub dependencies: Vec<String>,
    #[serde(rename = "peerDependencies")]
    pub peer_dependencies: Vec<String>,
    pub downloads: Downloads,
    pub dependent_packages_count: u64,
    pub dependent_repos_count: u64,
    pub latest_version: String,
    #[serde(default)]
    pub npm_timestamps: NpmTimestamps,
}

/// The `update_fields` projection produced by the record builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RecordUpdate {
    #[serde(flatten)]
    pub fields: RecordFields,
    /// Write time; becomes the record's `last_updated`.
    pub db_updated_at: DateTime<Utc>,
}

impl RecordUpdate {
    /// Turn an update into a brand new record, stamping `created_time`.
    #[must_use]
    pub fn into_record(self, name: &str) -> PackageRecord {
        PackageRecord {
            name: name.to_string(),
            fields: self.fields,
            created_time: self.db_updated_at,
            last_updated: self.db_updated_at,
        }
    }
}

/// One enriched package as stored. `name` is unique across the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PackageRecord {
    pub name: String,
    #[serde(flatten)]
    pub fields: RecordFields,
    /// Set once, at first insert.
    pub created_time: DateTime<Utc>,
    /// Set on every write.
    pub last_updated: DateTime<Utc>,
}
