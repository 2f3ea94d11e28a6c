//! Loading configuration files and wiring components from them.

mod common;

use serde_json::json;
use serial_test::serial;
use tempfile::TempDir;

use common::ConfigBuilder;
use invoicewatch::analyzer::{GeminiAnalyzer, ResilientAnalyzer};
use invoicewatch::config::load_config;
use invoicewatch::db::Database;
use invoicewatch::store::{RecordStore, SqliteRecordStore};
use invoicewatch::ConfigError;

#[tokio::test]
async fn test_config_drives_database_and_owner() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("db").join("records.db");
    let config_path = dir.path().join("invoicewatch.json");

    ConfigBuilder::new()
        .currency("USD")
        .database_path(&db_path)
        .owner("tenant-42", "books@example.com")
        .write_to(&config_path);

    let config = load_config(&config_path).unwrap();
    assert_eq!(config.currency, "USD");

    let db = Database::open(&config.database_path().unwrap()).unwrap();
    let store = SqliteRecordStore::new(db);
    assert!(store.ensure_owner(&config.owner.to_owner()).await.unwrap());
    assert!(db_path.exists());
}

#[test]
fn test_analyzer_key_from_file() {
    let dir = TempDir::new().unwrap();
    let key_path = dir.path().join("api-key");
    std::fs::write(&key_path, "test-key\n").unwrap();
    let config_path = dir.path().join("invoicewatch.json");

    ConfigBuilder::new()
        .analyzer(json!({
            "api_key_file": key_path.to_string_lossy(),
            "api_key_env_var": null,
            "timeout_secs": 5,
            "max_retries": 0
        }))
        .write_to(&config_path);

    let config = load_config(&config_path).unwrap();
    let gemini = GeminiAnalyzer::from_config(&config.analyzer).unwrap();
    assert_eq!(gemini.model(), "gemini-3-flash-preview");
    let _resilient = ResilientAnalyzer::from_config(gemini, &config.analyzer);
}

#[test]
#[serial]
fn test_analyzer_key_from_env() {
    std::env::set_var("IW_IT_ANALYZER_KEY", "env-key");
    let config = invoicewatch::load_config_from_str(
        &ConfigBuilder::new()
            .analyzer(json!({ "api_key_env_var": "IW_IT_ANALYZER_KEY" }))
            .build(),
    )
    .unwrap();
    assert!(GeminiAnalyzer::from_config(&config.analyzer).is_ok());
    std::env::remove_var("IW_IT_ANALYZER_KEY");
}

#[test]
#[serial]
fn test_missing_key_is_a_config_error() {
    std::env::remove_var("IW_IT_ABSENT_KEY");
    let config = invoicewatch::load_config_from_str(
        &ConfigBuilder::new()
            .analyzer(json!({ "api_key_env_var": "IW_IT_ABSENT_KEY" }))
            .build(),
    )
    .unwrap();
    assert!(GeminiAnalyzer::from_config(&config.analyzer).is_err());
}

#[test]
fn test_invalid_bind_rejected() {
    let result = invoicewatch::load_config_from_str(&ConfigBuilder::new().bind("nowhere").build());
    assert!(matches!(result, Err(ConfigError::InvalidBind { .. })));
}
