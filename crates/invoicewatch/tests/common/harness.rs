//! Test harness for isolated intake runs.
//!
//! Each harness owns a temp directory holding a file-backed SQLite database.
//! Analysis is served from canned JSON payloads under
//! `tests/fixtures/responses/`, looked up by the document's file stem.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use tempfile::TempDir;

use invoicewatch::analyzer::{AnalyzeError, Document, DocumentAnalyzer, RawExtraction};
use invoicewatch::db::Database;
use invoicewatch::intake::IntakePipeline;
use invoicewatch::store::{Owner, SqliteRecordStore};

/// Serves `<stem>.json` from the fixture directory for each document.
/// A missing fixture is a provider rejection; an unparseable one is an
/// invalid response.
pub struct FixtureAnalyzer {
    dir: PathBuf,
    calls: Mutex<Vec<String>>,
}

impl FixtureAnalyzer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentAnalyzer for FixtureAnalyzer {
    async fn analyze(&self, document: &Document) -> Result<RawExtraction, AnalyzeError> {
        self.calls.lock().unwrap().push(document.file_name.clone());

        let stem = Path::new(&document.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let path = self.dir.join(format!("{stem}.json"));

        let body = std::fs::read_to_string(&path)
            .map_err(|_| AnalyzeError::Rejected(format!("no fixture for {stem}")))?;
        serde_json::from_str(&body).map_err(|e| AnalyzeError::InvalidResponse(e.to_string()))
    }
}

pub struct TestHarness {
    temp_dir: TempDir,
    pub db_path: PathBuf,
    pub owner: Owner,
    pub analyzer: Arc<FixtureAnalyzer>,
    pub store: SqliteRecordStore,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("data").join("invoicewatch.db");
        let db = Database::open(&db_path).expect("Failed to open test database");

        Self {
            temp_dir,
            db_path,
            owner: Owner {
                id: "user_master_v1".to_string(),
                email: "admin@demo.com".to_string(),
                name: "System Admin".to_string(),
                business_name: "My Company".to_string(),
            },
            analyzer: Arc::new(FixtureAnalyzer::new(Self::fixture_dir())),
            store: SqliteRecordStore::new(db),
        }
    }

    pub fn fixture_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("responses")
    }

    /// The date used for missing invoice fields.
    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn pipeline(&self) -> IntakePipeline<Arc<FixtureAnalyzer>, SqliteRecordStore> {
        IntakePipeline::new(
            Arc::clone(&self.analyzer),
            self.store.clone(),
            self.owner.clone(),
            "INR",
        )
        .with_today(Self::today)
    }

    /// Opens a second, independent connection to the same database file.
    pub fn reopen_store(&self) -> SqliteRecordStore {
        SqliteRecordStore::new(Database::open(&self.db_path).expect("Failed to reopen database"))
    }
}
