//! Owner repository: create-if-absent and lookup for the `owners` table.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{Database, DatabaseError};

/// A raw owner row from the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerRow {
    pub id: String,
    pub email: String,
    pub name: String,
    pub business_name: String,
    pub created_at: String,
}

impl OwnerRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            email: row.get("email")?,
            name: row.get("name")?,
            business_name: row.get("business_name")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Inserts the owner unless a row with the same id already exists.
///
/// Existing rows are left untouched. Returns `true` when a row was created.
/// Takes a bare connection so it can join a caller's transaction.
pub fn ensure_in(conn: &Connection, owner: &OwnerRow) -> Result<bool, DatabaseError> {
    let inserted = conn.execute(
        "INSERT INTO owners (id, email, name, business_name, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO NOTHING",
        params![
            owner.id,
            owner.email,
            owner.name,
            owner.business_name,
            owner.created_at,
        ],
    )?;
    Ok(inserted > 0)
}

/// Idempotent create-if-absent for an owner.
pub fn ensure(db: &Database, owner: &OwnerRow) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| ensure_in(conn, owner))
}

/// Finds an owner by id.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<OwnerRow>, DatabaseError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT * FROM owners WHERE id = ?1",
                params![id],
                OwnerRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}

/// Counts all owners.
pub fn count(db: &Database) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM owners", [], |r| r.get(0))?;
        Ok(count)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open_in_memory().expect("Failed to create test database")
    }

    fn sample_owner(id: &str) -> OwnerRow {
        OwnerRow {
            id: id.to_string(),
            email: "admin@demo.com".to_string(),
            name: "System Admin".to_string(),
            business_name: "My Company".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_ensure_creates_owner() {
        let db = test_db();
        assert!(ensure(&db, &sample_owner("owner-1")).unwrap());

        let found = find_by_id(&db, "owner-1").unwrap().unwrap();
        assert_eq!(found.email, "admin@demo.com");
        assert_eq!(found.business_name, "My Company");
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let db = test_db();
        assert!(ensure(&db, &sample_owner("owner-1")).unwrap());
        assert!(!ensure(&db, &sample_owner("owner-1")).unwrap());
        assert_eq!(count(&db).unwrap(), 1);
    }

    #[test]
    fn test_ensure_keeps_existing_values() {
        let db = test_db();
        ensure(&db, &sample_owner("owner-1")).unwrap();

        let mut renamed = sample_owner("owner-1");
        renamed.name = "Someone Else".to_string();
        ensure(&db, &renamed).unwrap();

        let found = find_by_id(&db, "owner-1").unwrap().unwrap();
        assert_eq!(found.name, "System Admin");
    }

    #[test]
    fn test_find_nonexistent() {
        let db = test_db();
        assert!(find_by_id(&db, "ghost").unwrap().is_none());
    }
}
