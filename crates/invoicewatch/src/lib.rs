pub mod analyzer;
pub mod broadcast;
pub mod config;
pub mod db;
pub mod error;
pub mod extraction;
pub mod intake;
pub mod metrics;
pub mod sanitize;
pub mod secrets;
pub mod store;
pub mod telemetry;

pub use analyzer::{
    AnalyzeError, Document, DocumentAnalyzer, GeminiAnalyzer, RawExtraction, ResilientAnalyzer,
};
pub use broadcast::{BatchProgressBroadcaster, BatchProgressEvent};
pub use config::{load_config, load_config_from_str, Config};
pub use db::Database;
pub use error::{ConfigError, InvoiceWatchError, Result};
pub use extraction::{ExtractionResult, RiskLevel};
pub use intake::{
    BatchJob, BatchReport, BatchStatus, IntakeError, IntakePipeline, ProgressReporter,
    ReportAccumulator, ReportEntry,
};
pub use metrics::{DashboardSummary, VendorProfile};
pub use secrets::{resolve_secret, SecretError};
pub use store::{InvoiceRecord, NewInvoice, Owner, RecordStore, SqliteRecordStore, StoreError};
