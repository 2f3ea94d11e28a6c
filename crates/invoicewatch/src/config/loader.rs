use std::net::SocketAddr;
use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;
use crate::secrets::has_secret_source;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.owner.id.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "owner.id must not be empty".to_string(),
        });
    }

    if !config.owner.email.contains('@') {
        return Err(ConfigError::Validation {
            message: format!("owner.email '{}' is not an email address", config.owner.email),
        });
    }

    if config.analyzer.timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "analyzer.timeout_secs must be positive".to_string(),
        });
    }

    let analyzer = &config.analyzer;
    if !has_secret_source(
        analyzer.api_key.as_deref(),
        analyzer.api_key_file.as_deref(),
        analyzer.api_key_env_var.as_deref(),
    ) {
        log::warn!("No analyzer API key source configured; document analysis will fail");
    }

    if config.server.bind.parse::<SocketAddr>().is_err() {
        return Err(ConfigError::InvalidBind {
            bind: config.server.bind.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_minimal_config_applies_defaults() {
        let config = load_config_from_str(r#"{ "version": "1.0" }"#).unwrap();
        assert_eq!(config.currency, "INR");
        assert_eq!(config.owner.id, "user_master_v1");
        assert_eq!(config.analyzer.model, "gemini-3-flash-preview");
        assert_eq!(config.analyzer.timeout_secs, 60);
        assert_eq!(config.analyzer.max_retries, 1);
        assert_eq!(
            config.analyzer.api_key_env_var.as_deref(),
            Some("GOOGLE_GENERATIVE_AI_API_KEY")
        );
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert!(config.database.path.is_none());
    }

    #[test]
    fn test_load_full_config() {
        let config_json = r#"
        {
            "version": "1.0",
            "currency": "EUR",
            "database": { "path": "/var/lib/invoicewatch/db.sqlite" },
            "owner": {
                "id": "tenant-7",
                "email": "ops@example.com",
                "name": "Ops",
                "business_name": "Example GmbH"
            },
            "analyzer": {
                "model": "gemini-2.5-flash",
                "timeout_secs": 20,
                "max_retries": 2,
                "retry_backoff_ms": 0,
                "api_key_env_var": "MY_KEY"
            },
            "server": { "bind": "0.0.0.0:9000" },
            "logging": { "level": "debug", "json": true }
        }
        "#;

        let config = load_config_from_str(config_json).unwrap();
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.owner.id, "tenant-7");
        assert_eq!(config.owner.to_owner().business_name, "Example GmbH");
        assert_eq!(config.analyzer.model, "gemini-2.5-flash");
        assert_eq!(config.analyzer.max_retries, 2);
        assert_eq!(config.analyzer.api_key_env_var.as_deref(), Some("MY_KEY"));
        assert!(config.logging.json);
    }

    #[test]
    fn test_invalid_version() {
        let result = load_config_from_str(r#"{ "version": "2.0" }"#);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_unknown_field_rejected_by_schema() {
        let result = load_config_from_str(r#"{ "version": "1.0", "workers": 4 }"#);
        assert!(matches!(result, Err(ConfigError::SchemaValidation { .. })));
    }

    #[test]
    fn test_zero_timeout_rejected_by_schema() {
        let result =
            load_config_from_str(r#"{ "version": "1.0", "analyzer": { "timeout_secs": 0 } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_owner_rejected() {
        let result = load_config_from_str(r#"{ "version": "1.0", "owner": { "id": "  " } }"#);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_bad_owner_email_rejected() {
        let result =
            load_config_from_str(r#"{ "version": "1.0", "owner": { "email": "nobody" } }"#);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_bad_bind_rejected() {
        let result =
            load_config_from_str(r#"{ "version": "1.0", "server": { "bind": "localhost" } }"#);
        assert!(matches!(result, Err(ConfigError::InvalidBind { .. })));
    }

    #[test]
    fn test_malformed_json() {
        let result = load_config_from_str("{ not json");
        assert!(matches!(result, Err(ConfigError::ParseJson(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoicewatch.json");
        std::fs::write(&path, r#"{ "version": "1.0", "currency": "USD" }"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.currency, "USD");
    }

    #[test]
    fn test_database_path() {
        let config = load_config_from_str(
            r#"{ "version": "1.0", "database": { "path": "/tmp/iw/records.db" } }"#,
        )
        .unwrap();
        assert_eq!(
            config.database_path().unwrap(),
            std::path::PathBuf::from("/tmp/iw/records.db")
        );

        let config = Config::default();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                config.database_path().unwrap(),
                home.join(".invoicewatch/data/invoicewatch.db")
            );
        }
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/invoicewatch.json");
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }
}
