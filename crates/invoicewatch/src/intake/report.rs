use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::job::BatchStatus;
use crate::extraction::{ExtractionResult, RiskLevel};
use crate::store::InvoiceRecord;

/// Prefix of entry ids that do not name a stored record.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// One analyzed file as shown in the batch results table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    /// Record id, or a `local-` placeholder when saving failed.
    pub id: String,
    pub persisted: bool,
    pub file_name: String,
    pub vendor_name: String,
    pub amount: f64,
    pub invoice_date: NaiveDate,
    pub risk_level: RiskLevel,
    pub legal_impact: String,
    pub payment_advice: String,
    pub summary: String,
}

impl ReportEntry {
    pub fn from_record(record: &InvoiceRecord, file_name: &str) -> Self {
        Self {
            id: record.id.clone(),
            persisted: true,
            file_name: file_name.to_string(),
            vendor_name: record.vendor_name.clone(),
            amount: record.amount,
            invoice_date: record.invoice_date,
            risk_level: record.risk_level,
            legal_impact: record.legal_impact.clone(),
            payment_advice: record.payment_advice.clone(),
            summary: record.summary.clone(),
        }
    }

    /// Entry for a file whose analysis succeeded but could not be saved.
    pub fn unsaved(extraction: &ExtractionResult, file_name: &str) -> Self {
        Self {
            id: format!("{}{}", LOCAL_ID_PREFIX, Uuid::new_v4()),
            persisted: false,
            file_name: file_name.to_string(),
            vendor_name: extraction.vendor_name.clone(),
            amount: extraction.total_amount,
            invoice_date: extraction.invoice_date,
            risk_level: extraction.risk_level,
            legal_impact: extraction.legal_impact.clone(),
            payment_advice: extraction.payment_advice.clone(),
            summary: extraction.summary.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Analyze,
    Store,
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureStage::Analyze => write!(f, "analysis"),
            FailureStage::Store => write!(f, "save"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFailure {
    pub file_name: String,
    pub stage: FailureStage,
    pub message: String,
}

/// Append-only list of entries for one session, plus the failures seen
/// while building it.
#[derive(Debug, Default)]
pub struct ReportAccumulator {
    entries: Vec<ReportEntry>,
    failures: Vec<FileFailure>,
}

impl ReportAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    pub fn record_failure(&mut self, failure: FileFailure) {
        self.failures.push(failure);
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn failures(&self) -> &[FileFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.failures.clear();
    }

    pub fn into_report(self, batch_id: &str, status: BatchStatus, total_files: usize) -> BatchReport {
        BatchReport {
            batch_id: batch_id.to_string(),
            status,
            total_files,
            entries: self.entries,
            failures: self.failures,
        }
    }
}

/// Result of one batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub batch_id: String,
    pub status: BatchStatus,
    pub total_files: usize,
    pub entries: Vec<ReportEntry>,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn saved_count(&self) -> usize {
        self.entries.iter().filter(|e| e.persisted).count()
    }

    pub fn high_risk_count(&self) -> usize {
        self.entries.iter().filter(|e| e.risk_level.is_high()).count()
    }
}
