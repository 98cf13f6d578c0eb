//! Embedded schema migrations, run on every open. All statements are
//! `IF NOT EXISTS`.

use crate::PackageStore;
use crate::error::DatabaseError;

const MIGRATION_001: &str = include_str!("../migrations/001_packages.sql");

impl PackageStore {
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_packages: {e}")))?;
        Ok(())
    }
}
