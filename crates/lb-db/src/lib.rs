//! # lb-db
//!
//! libSQL document store for enriched package records.
//!
//! One row per package name. The mutable fields live in a JSON `document`
//! column and are rewritten with SQLite's `json_patch`, so a refresh replaces
//! exactly the fields it produced and leaves `name` and `created_time` alone.
//! Run bookkeeping (last successful sync) lives in a small `settings` table.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;

use std::path::Path;

use error::DatabaseError;
use lb_config::StoreConfig;
use libsql::Builder;

/// Handle to the package store.
pub struct PackageStore {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl PackageStore {
    /// Open (or create) the store described by `config`, creating the parent
    /// directory of a file-backed database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the directory cannot be created, the
    /// database cannot be opened, or migrations fail.
    pub async fn open(config: &StoreConfig) -> Result<Self, DatabaseError> {
        if !config.is_in_memory() {
            let parent = Path::new(&config.path).parent();
            if let Some(dir) = parent.filter(|dir| !dir.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }
        }
        Self::open_local(&config.path).await
    }

    /// Open a local database at the given path. `:memory:` gives a private
    /// in-memory store.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let store = Self { db, conn };
        store.run_migrations().await?;
        tracing::debug!(path, "package store opened");
        Ok(store)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_local_creates_schema() {
        let store = PackageStore::open_local(":memory:").await.unwrap();
        let mut rows = store
            .conn()
            .query(
                "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                (),
            )
            .await
            .unwrap();
        let mut tables = Vec::new();
        while let Some(row) = rows.next().await.unwrap() {
            tables.push(row.get::<String>(0).unwrap());
        }
        assert!(tables.contains(&"packages".to_string()));
        assert!(tables.contains(&"settings".to_string()));
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let store = PackageStore::open_local(":memory:").await.unwrap();
        store.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/store.db");
        let config = StoreConfig {
            path: path.to_string_lossy().into_owned(),
        };
        let store = PackageStore::open(&config).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(path.exists());
    }
}
