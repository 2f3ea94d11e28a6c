//! Risk statistics repository: aggregate queries over the `invoices` table.

use rusqlite::params;
use serde::Serialize;

use super::{Database, DatabaseError};

/// Count and amount total for one risk level.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskLevelStat {
    pub risk_level: String,
    pub count: u64,
    pub total_amount: f64,
}

/// Groups an owner's invoices by risk level.
///
/// Levels with no invoices are absent from the result.
pub fn risk_breakdown(db: &Database, owner_id: &str) -> Result<Vec<RiskLevelStat>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT risk_level, COUNT(*), COALESCE(SUM(amount), 0.0)
             FROM invoices WHERE owner_id = ?1
             GROUP BY risk_level ORDER BY risk_level",
        )?;
        let rows = stmt
            .query_map(params![owner_id], |row| {
                Ok(RiskLevelStat {
                    risk_level: row.get(0)?,
                    count: row.get(1)?,
                    total_amount: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}
