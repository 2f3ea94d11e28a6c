//! Record store: the persistence interface the intake pipeline and the
//! read-side pages consume, plus its SQLite implementation.

mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::DatabaseError;
use crate::extraction::{ExtractionResult, RiskLevel};

pub use sqlite::SqliteRecordStore;

/// Status stamped on every record created by intake.
pub const STATUS_COMPLETED: &str = "COMPLETED";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Store task failed: {0}")]
    Join(String),
}

/// The identity that owns every persisted invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: String,
    pub email: String,
    pub name: String,
    pub business_name: String,
}

/// Everything needed to create a record except the store-assigned id and
/// timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub extraction: ExtractionResult,
    pub currency: String,
    pub requires_license: bool,
    pub source_file: Option<String>,
}

impl NewInvoice {
    pub fn new(extraction: ExtractionResult, currency: impl Into<String>) -> Self {
        Self {
            extraction,
            currency: currency.into(),
            requires_license: false,
            source_file: None,
        }
    }

    pub fn with_source_file(mut self, file_name: impl Into<String>) -> Self {
        self.source_file = Some(file_name.into());
        self
    }
}

/// A persisted invoice. Records are never updated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    pub id: String,
    pub owner_id: String,
    pub vendor_name: String,
    pub amount: f64,
    pub currency: String,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub summary: String,
    pub is_gst_missing: bool,
    pub is_regulatory_item: bool,
    pub requires_license: bool,
    pub risk_level: RiskLevel,
    pub legal_impact: String,
    pub payment_advice: String,
    pub status: String,
    pub source_file: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Count and amount total for one risk level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskBucket {
    pub count: u64,
    pub total_amount: f64,
}

/// Per-level totals over all of an owner's invoices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSummary {
    pub low: RiskBucket,
    pub medium: RiskBucket,
    pub high: RiskBucket,
}

impl RiskSummary {
    pub fn total_count(&self) -> u64 {
        self.low.count + self.medium.count + self.high.count
    }

    pub fn bucket_mut(&mut self, level: RiskLevel) -> &mut RiskBucket {
        match level {
            RiskLevel::Low => &mut self.low,
            RiskLevel::Medium => &mut self.medium,
            RiskLevel::High => &mut self.high,
        }
    }
}

/// Persistence of invoice records. Every query is scoped to one owner.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Creates the owner if absent. Returns `true` when a row was created.
    async fn ensure_owner(&self, owner: &Owner) -> Result<bool, StoreError>;

    /// Ensures the owner and inserts the record atomically.
    async fn create(&self, owner: &Owner, invoice: NewInvoice) -> Result<InvoiceRecord, StoreError>;

    async fn get(&self, owner_id: &str, id: &str) -> Result<Option<InvoiceRecord>, StoreError>;

    /// Newest first. `None` means no limit.
    async fn list_by_owner(
        &self,
        owner_id: &str,
        limit: Option<u64>,
    ) -> Result<Vec<InvoiceRecord>, StoreError>;

    /// Latest invoice date first.
    async fn list_by_vendor(
        &self,
        owner_id: &str,
        vendor_name: &str,
    ) -> Result<Vec<InvoiceRecord>, StoreError>;

    async fn risk_summary(&self, owner_id: &str) -> Result<RiskSummary, StoreError>;

    async fn delete(&self, owner_id: &str, id: &str) -> Result<bool, StoreError>;

    async fn delete_all(&self, owner_id: &str) -> Result<u64, StoreError>;
}

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for std::sync::Arc<T> {
    async fn ensure_owner(&self, owner: &Owner) -> Result<bool, StoreError> {
        (**self).ensure_owner(owner).await
    }

    async fn create(&self, owner: &Owner, invoice: NewInvoice) -> Result<InvoiceRecord, StoreError> {
        (**self).create(owner, invoice).await
    }

    async fn get(&self, owner_id: &str, id: &str) -> Result<Option<InvoiceRecord>, StoreError> {
        (**self).get(owner_id, id).await
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        limit: Option<u64>,
    ) -> Result<Vec<InvoiceRecord>, StoreError> {
        (**self).list_by_owner(owner_id, limit).await
    }

    async fn list_by_vendor(
        &self,
        owner_id: &str,
        vendor_name: &str,
    ) -> Result<Vec<InvoiceRecord>, StoreError> {
        (**self).list_by_vendor(owner_id, vendor_name).await
    }

    async fn risk_summary(&self, owner_id: &str) -> Result<RiskSummary, StoreError> {
        (**self).risk_summary(owner_id).await
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<bool, StoreError> {
        (**self).delete(owner_id, id).await
    }

    async fn delete_all(&self, owner_id: &str) -> Result<u64, StoreError> {
        (**self).delete_all(owner_id).await
    }
}
