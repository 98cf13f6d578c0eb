use chrono::{DateTime, NaiveDateTime, Utc};
use lb_core::record::PackageRecord;

use crate::error::DatabaseError;

/// Parse a timestamp column written either by this crate (RFC 3339) or by a
/// SQLite default such as `datetime('now')` (`YYYY-MM-DD HH:MM:SS`, UTC).
///
/// # Errors
///
/// Returns [`DatabaseError::Query`] when neither form matches.
pub fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|at| at.and_utc()))
        .map_err(|e| DatabaseError::Query(format!("bad timestamp {raw:?}: {e}")))
}

/// Map a `name, document, created_time, last_updated` row.
///
/// # Errors
///
/// Returns `DatabaseError` if a column is missing or the document does not
/// deserialize into record fields.
pub fn row_to_record(row: &libsql::Row) -> Result<PackageRecord, DatabaseError> {
    let document = row.get::<String>(1)?;
    Ok(PackageRecord {
        name: row.get::<String>(0)?,
        fields: serde_json::from_str(&document)?,
        created_time: parse_datetime(&row.get::<String>(2)?)?,
        last_updated: parse_datetime(&row.get::<String>(3)?)?,
    })
}
