//! Record builder: merges the three fetch results into one update.
//!
//! Pure: no network, no store. Callers only get here when all three fetches
//! succeeded, so a partially enriched record cannot be produced.

use chrono::{DateTime, Utc};

use crate::record::{Downloads, NpmTimestamps, RecordFields, RecordUpdate, WeeklyTrend};
use crate::upstream::{EcosystemStats, RegistryMetadata};

/// Public npm page for a package.
#[must_use]
pub fn package_link(name: &str) -> String {
    format!("https://www.npmjs.com/package/{name}")
}

/// Build the `update_fields` projection for `name`.
#[must_use]
pub fn build_update(
    name: &str,
    metadata: RegistryMetadata,
    stats: EcosystemStats,
    weekly_trends: Vec<WeeklyTrend>,
    now: DateTime<Utc>,
) -> RecordUpdate {
    RecordUpdate {
        fields: RecordFields {
            description: metadata.description,
            link: package_link(name),
            dependencies: metadata.dependencies,
            peer_dependencies: metadata.peer_dependencies,
            downloads: Downloads {
                total: stats.total_downloads,
                weekly_trends,
            },
            dependent_packages_count: stats.dependent_packages_count,
            dependent_repos_count: stats.dependent_repos_count,
            latest_version: metadata.latest_version,
            npm_timestamps: NpmTimestamps {
                created_at: metadata.created_at,
                modified_at: metadata.modified_at,
            },
        },
        db_updated_at: now,
    }
}
