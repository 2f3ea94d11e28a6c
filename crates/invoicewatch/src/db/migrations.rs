//! Schema migrations.
//!
//! The applied schema version lives in SQLite's `user_version` header
//! field. Each step runs in its own transaction together with the version
//! bump, so a failed step leaves the database at the previous version.

use rusqlite::Connection;

use super::error::DatabaseError;

/// Ordered schema steps; step `i` brings the database to version `i + 1`.
const STEPS: &[(&str, &str)] = &[
    ("create owners", include_str!("sql/001_create_owners.sql")),
    ("create invoices", include_str!("sql/002_create_invoices.sql")),
];

pub fn schema_version(conn: &Connection) -> Result<u32, DatabaseError> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Brings the schema up to date. Returns the number of steps applied.
pub fn migrate(conn: &mut Connection) -> Result<usize, DatabaseError> {
    let current = schema_version(conn)? as usize;
    if current > STEPS.len() {
        return Err(DatabaseError::Migration {
            version: current as u32,
            reason: format!("database is newer than this build (knows {})", STEPS.len()),
        });
    }

    for (index, (name, sql)) in STEPS.iter().enumerate().skip(current) {
        let version = index as u32 + 1;
        log::info!("Applying schema v{}: {}", version, name);

        let failed = |e: rusqlite::Error| DatabaseError::Migration {
            version,
            reason: e.to_string(),
        };
        let tx = conn.transaction().map_err(failed)?;
        tx.execute_batch(sql).map_err(failed)?;
        tx.pragma_update(None, "user_version", version).map_err(failed)?;
        tx.commit().map_err(failed)?;
    }

    Ok(STEPS.len() - current)
}
