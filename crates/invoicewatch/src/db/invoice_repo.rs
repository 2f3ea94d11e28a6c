//! Invoice repository: create, query, and delete operations for the
//! `invoices` table. Every query is scoped to an owner id.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::owner_repo::{self, OwnerRow};
use super::{Database, DatabaseError};

/// A raw invoice row from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRow {
    pub id: String,
    pub owner_id: String,
    pub vendor_name: String,
    pub amount: f64,
    pub currency: String,
    pub invoice_date: String,
    pub due_date: String,
    pub summary: String,
    pub is_gst_missing: bool,
    pub is_regulatory_item: bool,
    pub requires_license: bool,
    pub risk_level: String,
    pub legal_impact: String,
    pub payment_advice: String,
    pub status: String,
    pub source_file: Option<String>,
    pub created_at: String,
}

impl InvoiceRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            owner_id: row.get("owner_id")?,
            vendor_name: row.get("vendor_name")?,
            amount: row.get("amount")?,
            currency: row.get("currency")?,
            invoice_date: row.get("invoice_date")?,
            due_date: row.get("due_date")?,
            summary: row.get("summary")?,
            is_gst_missing: row.get("is_gst_missing")?,
            is_regulatory_item: row.get("is_regulatory_item")?,
            requires_license: row.get("requires_license")?,
            risk_level: row.get("risk_level")?,
            legal_impact: row.get("legal_impact")?,
            payment_advice: row.get("payment_advice")?,
            status: row.get("status")?,
            source_file: row.get("source_file")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Inserts an invoice row on the given connection (or transaction).
pub fn insert_in(conn: &Connection, invoice: &InvoiceRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO invoices (id, owner_id, vendor_name, amount, currency, invoice_date,
         due_date, summary, is_gst_missing, is_regulatory_item, requires_license, risk_level,
         legal_impact, payment_advice, status, source_file, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            invoice.id,
            invoice.owner_id,
            invoice.vendor_name,
            invoice.amount,
            invoice.currency,
            invoice.invoice_date,
            invoice.due_date,
            invoice.summary,
            invoice.is_gst_missing,
            invoice.is_regulatory_item,
            invoice.requires_license,
            invoice.risk_level,
            invoice.legal_impact,
            invoice.payment_advice,
            invoice.status,
            invoice.source_file,
            invoice.created_at,
        ],
    )?;
    Ok(())
}

/// Ensures the owner exists and inserts the invoice in a single transaction.
///
/// Either both rows exist afterwards or neither does. Returns whether the
/// owner row had to be created.
pub fn insert_with_owner(
    db: &Database,
    owner: &OwnerRow,
    invoice: &InvoiceRow,
) -> Result<bool, DatabaseError> {
    db.with_transaction(|tx| {
        let created_owner = owner_repo::ensure_in(tx, owner)?;
        insert_in(tx, invoice)?;
        Ok(created_owner)
    })
}

/// Finds one invoice belonging to `owner_id`.
pub fn find_by_id(
    db: &Database,
    owner_id: &str,
    id: &str,
) -> Result<Option<InvoiceRow>, DatabaseError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT * FROM invoices WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id],
                InvoiceRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}

/// Lists an owner's invoices, newest upload first.
pub fn list_by_owner(
    db: &Database,
    owner_id: &str,
    limit: Option<u64>,
) -> Result<Vec<InvoiceRow>, DatabaseError> {
    db.with_conn(|conn| {
        // SQLite treats a negative LIMIT as "no limit".
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let mut stmt = conn.prepare(
            "SELECT * FROM invoices WHERE owner_id = ?1
             ORDER BY created_at DESC, rowid DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![owner_id, limit], InvoiceRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Lists an owner's invoices from one vendor, latest invoice date first.
pub fn list_by_vendor(
    db: &Database,
    owner_id: &str,
    vendor_name: &str,
) -> Result<Vec<InvoiceRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM invoices WHERE owner_id = ?1 AND vendor_name = ?2
             ORDER BY invoice_date DESC, created_at DESC",
        )?;
        let rows = stmt
            .query_map(params![owner_id, vendor_name], InvoiceRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Deletes one invoice. Returns `false` when nothing matched.
pub fn delete_by_id(db: &Database, owner_id: &str, id: &str) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let deleted = conn.execute(
            "DELETE FROM invoices WHERE id = ?1 AND owner_id = ?2",
            params![id, owner_id],
        )?;
        Ok(deleted > 0)
    })
}

/// Deletes every invoice belonging to `owner_id`. Returns the number removed.
pub fn delete_all_by_owner(db: &Database, owner_id: &str) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let deleted = conn.execute(
            "DELETE FROM invoices WHERE owner_id = ?1",
            params![owner_id],
        )?;
        Ok(deleted as u64)
    })
}

/// Counts an owner's invoices.
pub fn count_by_owner(db: &Database, owner_id: &str) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM invoices WHERE owner_id = ?1",
            params![owner_id],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}
