//! Package documents: lookups and the three write shapes (insert-if-absent,
//! merge update, upsert).

use std::collections::HashSet;

use lb_core::record::{PackageRecord, RecordUpdate};

use crate::PackageStore;
use crate::error::DatabaseError;
use crate::helpers::row_to_record;

const SELECT_RECORD: &str = "SELECT name, document, created_time, last_updated FROM packages";

/// Serialized mutable fields of an update. `null` members are dropped by
/// `json_patch` on the way in.
fn document(update: &RecordUpdate) -> Result<String, DatabaseError> {
    Ok(serde_json::to_string(&update.fields)?)
}

impl PackageStore {
    pub async fn find(&self, name: &str) -> Result<Option<PackageRecord>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(&format!("{SELECT_RECORD} WHERE name = ?1"), [name])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    /// Every stored name, in insertion order.
    pub async fn all_names(&self) -> Result<Vec<String>, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT name FROM packages ORDER BY rowid", ())
            .await?;
        let mut names = Vec::new();
        while let Some(row) = rows.next().await? {
            names.push(row.get::<String>(0)?);
        }
        Ok(names)
    }

    /// The subset of `names` already stored, resolved in a single query.
    pub async fn existing_names(&self, names: &[String]) -> Result<HashSet<String>, DatabaseError> {
        if names.is_empty() {
            return Ok(HashSet::new());
        }
        let wanted = serde_json::to_string(names)?;
        let mut rows = self
            .conn()
            .query(
                "SELECT name FROM packages WHERE name IN (SELECT value FROM json_each(?1))",
                [wanted],
            )
            .await?;
        let mut found = HashSet::new();
        while let Some(row) = rows.next().await? {
            found.insert(row.get::<String>(0)?);
        }
        Ok(found)
    }

    /// Insert a new record stamped with `created_time = last_updated =
    /// db_updated_at`. Returns `false` and writes nothing if `name` exists.
    pub async fn insert(&self, name: &str, update: &RecordUpdate) -> Result<bool, DatabaseError> {
        let stamp = update.db_updated_at.to_rfc3339();
        let affected = self
            .conn()
            .execute(
                "INSERT INTO packages (name, document, created_time, last_updated)
                 VALUES (?1, json_patch('{}', ?2), ?3, ?3)
                 ON CONFLICT(name) DO NOTHING",
                libsql::params![name, document(update)?, stamp],
            )
            .await?;
        Ok(affected == 1)
    }

    /// Merge `update` into the stored document and bump `last_updated`.
    /// Keys the update does not carry survive. Returns `false` if no record
    /// is named `name`.
    pub async fn update(&self, name: &str, update: &RecordUpdate) -> Result<bool, DatabaseError> {
        let affected = self
            .conn()
            .execute(
                "UPDATE packages SET document = json_patch(document, ?2), last_updated = ?3
                 WHERE name = ?1",
                libsql::params![name, document(update)?, update.db_updated_at.to_rfc3339()],
            )
            .await?;
        Ok(affected > 0)
    }

    /// Insert or merge-update. `created_time` is only ever set by the insert.
    pub async fn upsert(&self, name: &str, update: &RecordUpdate) -> Result<(), DatabaseError> {
        let stamp = update.db_updated_at.to_rfc3339();
        self.conn()
            .execute(
                "INSERT INTO packages (name, document, created_time, last_updated)
                 VALUES (?1, json_patch('{}', ?2), ?3, ?3)
                 ON CONFLICT(name) DO UPDATE SET
                   document = json_patch(packages.document, ?2),
                   last_updated = ?3",
                libsql::params![name, document(update)?, stamp],
            )
            .await?;
        Ok(())
    }

    pub async fn count(&self) -> Result<u64, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT COUNT(*) FROM packages", ())
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        u64::try_from(row.get::<i64>(0)?)
            .map_err(|e| DatabaseError::Query(format!("negative row count: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use lb_core::record::{Downloads, NpmTimestamps, RecordFields};
    use pretty_assertions::assert_eq;

    async fn store() -> PackageStore {
        PackageStore::open_local(":memory:").await.unwrap()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 12, hour, 0, 0).unwrap()
    }

    fn update(version: &str, when: DateTime<Utc>) -> RecordUpdate {
        RecordUpdate {
            fields: RecordFields {
                description: "a package".into(),
                link: "https://www.npmjs.com/package/pkg".into(),
                dependencies: vec!["dep-a".into()],
                peer_dependencies: vec![],
                downloads: Downloads {
                    total: 10,
                    weekly_trends: vec![],
                },
                dependent_packages_count: 1,
                dependent_repos_count: 2,
                latest_version: version.into(),
                npm_timestamps: NpmTimestamps {
                    created_at: Some(at(1)),
                    modified_at: Some(at(2)),
                },
            },
            db_updated_at: when,
        }
    }

    #[tokio::test]
    async fn insert_then_find() {
        let store = store().await;
        assert!(store.insert("pkg", &update("1.0.0", at(9))).await.unwrap());

        let record = store.find("pkg").await.unwrap().unwrap();
        assert_eq!(record.name, "pkg");
        assert_eq!(record.fields.latest_version, "1.0.0");
        assert_eq!(record.created_time, at(9));
        assert_eq!(record.last_updated, at(9));
        assert_eq!(record.fields.npm_timestamps.created_at, Some(at(1)));
    }

    #[tokio::test]
    async fn insert_is_a_no_op_for_existing_names() {
        let store = store().await;
        assert!(store.insert("pkg", &update("1.0.0", at(9))).await.unwrap());
        assert!(!store.insert("pkg", &update("2.0.0", at(10))).await.unwrap());

        let record = store.find("pkg").await.unwrap().unwrap();
        assert_eq!(record.fields.latest_version, "1.0.0");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_keeps_identity_and_advances_last_updated() {
        let store = store().await;
        store.insert("pkg", &update("1.0.0", at(9))).await.unwrap();
        assert!(store.update("pkg", &update("1.1.0", at(12))).await.unwrap());

        let record = store.find("pkg").await.unwrap().unwrap();
        assert_eq!(record.name, "pkg");
        assert_eq!(record.created_time, at(9));
        assert_eq!(record.last_updated, at(12));
        assert_eq!(record.fields.latest_version, "1.1.0");
    }

    #[tokio::test]
    async fn update_of_unknown_name_matches_nothing() {
        let store = store().await;
        assert!(!store.update("ghost", &update("1.0.0", at(9))).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn absent_timestamps_are_not_stored() {
        let store = store().await;
        let mut bare = update("1.0.0", at(9));
        bare.fields.npm_timestamps = NpmTimestamps::default();
        store.insert("bare", &bare).await.unwrap();

        let mut rows = store
            .conn()
            .query(
                "SELECT json_extract(document, '$.npm_timestamps') FROM packages WHERE name = 'bare'",
                (),
            )
            .await
            .unwrap();
        let raw = rows.next().await.unwrap().unwrap().get::<String>(0).unwrap();
        assert_eq!(raw, "{}");

        let record = store.find("bare").await.unwrap().unwrap();
        assert_eq!(record.fields.npm_timestamps, NpmTimestamps::default());
    }

    #[tokio::test]
    async fn refresh_without_timestamps_clears_them() {
        let store = store().await;
        store.insert("pkg", &update("1.0.0", at(9))).await.unwrap();
        let mut bare = update("1.0.1", at(10));
        bare.fields.npm_timestamps.created_at = None;
        store.update("pkg", &bare).await.unwrap();

        let record = store.find("pkg").await.unwrap().unwrap();
        assert_eq!(record.fields.npm_timestamps.created_at, None);
        assert_eq!(record.fields.npm_timestamps.modified_at, Some(at(2)));
    }

    #[tokio::test]
    async fn keys_outside_the_update_survive() {
        let store = store().await;
        store.insert("pkg", &update("1.0.0", at(9))).await.unwrap();
        store
            .conn()
            .execute(
                "UPDATE packages SET document = json_set(document, '$.curated_tag', 'ui') WHERE name = 'pkg'",
                (),
            )
            .await
            .unwrap();
        store.update("pkg", &update("1.2.0", at(11))).await.unwrap();

        let mut rows = store
            .conn()
            .query(
                "SELECT json_extract(document, '$.curated_tag') FROM packages WHERE name = 'pkg'",
                (),
            )
            .await
            .unwrap();
        let tag = rows.next().await.unwrap().unwrap().get::<String>(0).unwrap();
        assert_eq!(tag, "ui");
    }

    #[tokio::test]
    async fn upsert_inserts_then_merges() {
        let store = store().await;
        store.upsert("pkg", &update("1.0.0", at(9))).await.unwrap();
        store.upsert("pkg", &update("2.0.0", at(9) + Duration::hours(5))).await.unwrap();

        let record = store.find("pkg").await.unwrap().unwrap();
        assert_eq!(record.created_time, at(9));
        assert_eq!(record.last_updated, at(14));
        assert_eq!(record.fields.latest_version, "2.0.0");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn existing_names_resolves_subset() {
        let store = store().await;
        for name in ["a", "@scope/b", "c"] {
            store.insert(name, &update("1.0.0", at(9))).await.unwrap();
        }
        let asked: Vec<String> = ["@scope/b", "c", "d"].map(String::from).to_vec();
        let found = store.existing_names(&asked).await.unwrap();
        assert_eq!(found, HashSet::from(["@scope/b".to_string(), "c".to_string()]));
        assert!(store.existing_names(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn all_names_in_insertion_order() {
        let store = store().await;
        for name in ["zeta", "alpha", "mid"] {
            store.insert(name, &update("1.0.0", at(9))).await.unwrap();
        }
        assert_eq!(store.all_names().await.unwrap(), vec!["zeta", "alpha", "mid"]);
    }
}
