use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::db::default_database_path;
use crate::error::ConfigError;
use crate::store::Owner;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub owner: OwnerConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            currency: default_currency(),
            database: DatabaseConfig::default(),
            owner: OwnerConfig::default(),
            analyzer: AnalyzerConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Configured database file, or the default location under the home
    /// directory. A leading `~/` is expanded.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        match self.database.path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => match path.strip_prefix("~/") {
                Some(rest) => dirs::home_dir()
                    .map(|home| home.join(rest))
                    .ok_or(ConfigError::NoDatabasePath),
                None => Ok(PathBuf::from(path)),
            },
            _ => default_database_path().ok_or(ConfigError::NoDatabasePath),
        }
    }
}

fn default_currency() -> String {
    "INR".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file. Falls back to `~/.invoicewatch/data/invoicewatch.db`.
    #[serde(default)]
    pub path: Option<String>,
}

/// The identity every record is attributed to.
///
/// There is no authentication; one configured owner stands in for "the
/// current user" and is injected into every component that persists or
/// queries records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerConfig {
    #[serde(default = "default_owner_id")]
    pub id: String,
    #[serde(default = "default_owner_email")]
    pub email: String,
    #[serde(default = "default_owner_name")]
    pub name: String,
    #[serde(default = "default_business_name")]
    pub business_name: String,
}

fn default_owner_id() -> String {
    "user_master_v1".to_string()
}

fn default_owner_email() -> String {
    "admin@demo.com".to_string()
}

fn default_owner_name() -> String {
    "System Admin".to_string()
}

fn default_business_name() -> String {
    "My Company".to_string()
}

impl Default for OwnerConfig {
    fn default() -> Self {
        Self {
            id: default_owner_id(),
            email: default_owner_email(),
            name: default_owner_name(),
            business_name: default_business_name(),
        }
    }
}

impl OwnerConfig {
    pub fn to_owner(&self) -> Owner {
        Owner {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            business_name: self.business_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Inline API key, for local testing only.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_file: Option<String>,
    #[serde(default = "default_api_key_env_var")]
    pub api_key_env_var: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_api_key_env_var() -> Option<String> {
    Some("GOOGLE_GENERATIVE_AI_API_KEY".to_string())
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    1
}

fn default_retry_backoff_ms() -> u64 {
    500
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key: None,
            api_key_file: None,
            api_key_env_var: default_api_key_env_var(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
