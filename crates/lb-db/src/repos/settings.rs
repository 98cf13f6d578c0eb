//! Key/value run bookkeeping.

use chrono::{DateTime, Utc};

use crate::PackageStore;
use crate::error::DatabaseError;
use crate::helpers::parse_datetime;

const LAST_SYNC: &str = "last_sync";

impl PackageStore {
    pub async fn set_setting(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
                libsql::params![key, value],
            )
            .await?;
        Ok(())
    }

    pub async fn setting(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT value FROM settings WHERE key = ?1", [key])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<String>(0)?)),
            None => Ok(None),
        }
    }

    /// Record the completion time of a successful sync.
    pub async fn set_last_sync(&self, at: DateTime<Utc>) -> Result<(), DatabaseError> {
        self.set_setting(LAST_SYNC, &at.to_rfc3339()).await
    }

    pub async fn last_sync(&self) -> Result<Option<DateTime<Utc>>, DatabaseError> {
        self.setting(LAST_SYNC)
            .await?
            .as_deref()
            .map(parse_datetime)
            .transpose()
    }
}
