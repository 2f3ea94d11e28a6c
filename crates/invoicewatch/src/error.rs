use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvoiceWatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Analyzer error: {0}")]
    Analyze(#[from] crate::analyzer::AnalyzeError),

    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Intake error: {0}")]
    Intake(#[from] crate::intake::IntakeError),

    #[error("Secret error: {0}")]
    Secret(#[from] crate::secrets::SecretError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid server bind address '{bind}'")]
    InvalidBind { bind: String },

    #[error("No database path configured and no home directory available")]
    NoDatabasePath,
}

pub type Result<T> = std::result::Result<T, InvoiceWatchError>;
