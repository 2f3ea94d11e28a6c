use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use uuid::Uuid;

use super::{
    InvoiceRecord, NewInvoice, Owner, RecordStore, RiskSummary, StoreError, STATUS_COMPLETED,
};
use crate::db::invoice_repo::{self, InvoiceRow};
use crate::db::owner_repo::{self, OwnerRow};
use crate::db::stats_repo;
use crate::db::{Database, DatabaseError};
use crate::extraction::RiskLevel;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// [`RecordStore`] over the SQLite [`Database`]. Each call runs on the
/// blocking thread pool.
#[derive(Clone)]
pub struct SqliteRecordStore {
    db: Database,
}

impl SqliteRecordStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn blocking<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Database) -> Result<T, DatabaseError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| StoreError::Join(e.to_string()))?
            .map_err(StoreError::from)
    }
}

fn owner_row(owner: &Owner, now: &str) -> OwnerRow {
    OwnerRow {
        id: owner.id.clone(),
        email: owner.email.clone(),
        name: owner.name.clone(),
        business_name: owner.business_name.clone(),
        created_at: now.to_string(),
    }
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn invoice_row(id: String, owner_id: &str, invoice: NewInvoice, created_at: String) -> InvoiceRow {
    let e = invoice.extraction;
    InvoiceRow {
        id,
        owner_id: owner_id.to_string(),
        vendor_name: e.vendor_name,
        amount: e.total_amount,
        currency: invoice.currency,
        invoice_date: e.invoice_date.format(DATE_FORMAT).to_string(),
        due_date: e.due_date.format(DATE_FORMAT).to_string(),
        summary: e.summary,
        is_gst_missing: e.is_gst_missing,
        is_regulatory_item: e.is_regulatory_item,
        requires_license: invoice.requires_license,
        risk_level: e.risk_level.as_str().to_string(),
        legal_impact: e.legal_impact,
        payment_advice: e.payment_advice,
        status: STATUS_COMPLETED.to_string(),
        source_file: invoice.source_file,
        created_at,
    }
}

impl TryFrom<InvoiceRow> for InvoiceRecord {
    type Error = DatabaseError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let invoice_date = parse_stored_date("invoice_date", &row.invoice_date)?;
        let due_date = parse_stored_date("due_date", &row.due_date)?;
        let risk_level: RiskLevel =
            row.risk_level
                .parse()
                .map_err(|_| DatabaseError::CorruptValue {
                    column: "risk_level",
                    value: row.risk_level.clone(),
                })?;
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|_| DatabaseError::CorruptValue {
                column: "created_at",
                value: row.created_at.clone(),
            })?
            .with_timezone(&Utc);

        Ok(Self {
            id: row.id,
            owner_id: row.owner_id,
            vendor_name: row.vendor_name,
            amount: row.amount,
            currency: row.currency,
            invoice_date,
            due_date,
            summary: row.summary,
            is_gst_missing: row.is_gst_missing,
            is_regulatory_item: row.is_regulatory_item,
            requires_license: row.requires_license,
            risk_level,
            legal_impact: row.legal_impact,
            payment_advice: row.payment_advice,
            status: row.status,
            source_file: row.source_file,
            created_at,
        })
    }
}

fn parse_stored_date(column: &'static str, value: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| DatabaseError::CorruptValue {
        column,
        value: value.to_string(),
    })
}

fn into_records(rows: Vec<InvoiceRow>) -> Result<Vec<InvoiceRecord>, DatabaseError> {
    rows.into_iter().map(InvoiceRecord::try_from).collect()
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn ensure_owner(&self, owner: &Owner) -> Result<bool, StoreError> {
        let row = owner_row(owner, &timestamp(Utc::now()));
        self.blocking(move |db| owner_repo::ensure(db, &row)).await
    }

    async fn create(&self, owner: &Owner, invoice: NewInvoice) -> Result<InvoiceRecord, StoreError> {
        let now = timestamp(Utc::now());
        let owner = owner_row(owner, &now);
        let row = invoice_row(Uuid::new_v4().to_string(), &owner.id, invoice, now);

        self.blocking(move |db| {
            let created_owner = invoice_repo::insert_with_owner(db, &owner, &row)?;
            if created_owner {
                log::info!("Created owner {}", owner.id);
            }
            log::debug!("Inserted invoice {} for owner {}", row.id, owner.id);
            InvoiceRecord::try_from(row)
        })
        .await
    }

    async fn get(&self, owner_id: &str, id: &str) -> Result<Option<InvoiceRecord>, StoreError> {
        let (owner_id, id) = (owner_id.to_string(), id.to_string());
        self.blocking(move |db| {
            invoice_repo::find_by_id(db, &owner_id, &id)?
                .map(InvoiceRecord::try_from)
                .transpose()
        })
        .await
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        limit: Option<u64>,
    ) -> Result<Vec<InvoiceRecord>, StoreError> {
        let owner_id = owner_id.to_string();
        self.blocking(move |db| into_records(invoice_repo::list_by_owner(db, &owner_id, limit)?))
            .await
    }

    async fn list_by_vendor(
        &self,
        owner_id: &str,
        vendor_name: &str,
    ) -> Result<Vec<InvoiceRecord>, StoreError> {
        let (owner_id, vendor_name) = (owner_id.to_string(), vendor_name.to_string());
        self.blocking(move |db| {
            into_records(invoice_repo::list_by_vendor(db, &owner_id, &vendor_name)?)
        })
        .await
    }

    async fn risk_summary(&self, owner_id: &str) -> Result<RiskSummary, StoreError> {
        let owner_id = owner_id.to_string();
        self.blocking(move |db| {
            let mut summary = RiskSummary::default();
            for stat in stats_repo::risk_breakdown(db, &owner_id)? {
                let level: RiskLevel =
                    stat.risk_level
                        .parse()
                        .map_err(|_| DatabaseError::CorruptValue {
                            column: "risk_level",
                            value: stat.risk_level.clone(),
                        })?;
                let bucket = summary.bucket_mut(level);
                bucket.count = stat.count;
                bucket.total_amount = stat.total_amount;
            }
            Ok(summary)
        })
        .await
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<bool, StoreError> {
        let (owner_id, id) = (owner_id.to_string(), id.to_string());
        self.blocking(move |db| {
            let deleted = invoice_repo::delete_by_id(db, &owner_id, &id)?;
            if deleted {
                log::info!("Deleted invoice {}", id);
            }
            Ok(deleted)
        })
        .await
    }

    async fn delete_all(&self, owner_id: &str) -> Result<u64, StoreError> {
        let owner_id = owner_id.to_string();
        self.blocking(move |db| {
            let deleted = invoice_repo::delete_all_by_owner(db, &owner_id)?;
            log::info!("Deleted {} invoices for owner {}", deleted, owner_id);
            Ok(deleted)
        })
        .await
    }
}
