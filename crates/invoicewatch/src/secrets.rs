//! Resolution of the analyzer API key.
//!
//! A key can be given inline in the config, as a path to a file holding it
//! (container secrets), or as the name of an environment variable. The
//! first non-empty source wins, in that order.

use std::path::PathBuf;

use secrecy::SecretString;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No API key configured (set a key, a key file, or a key environment variable)")]
    NoSourceProvided,

    #[error("Failed to read API key file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("API key file '{path}' is empty")]
    EmptyFile { path: String },

    #[error("Environment variable '{name}' is not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' is not valid UTF-8")]
    EnvVarNotUnicode { name: String },
}

pub type Result<T> = std::result::Result<T, SecretError>;

/// Returns the first configured secret: direct value, then file contents,
/// then environment variable. Values are trimmed; blank sources are skipped.
pub fn resolve_secret(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<SecretString> {
    if let Some(value) = non_blank(direct) {
        return Ok(SecretString::from(value.to_string()));
    }

    if let Some(path) = non_blank(file_path) {
        let expanded = expand_home(path);
        let display = expanded.display().to_string();
        let content = std::fs::read_to_string(&expanded).map_err(|source| SecretError::FileRead {
            path: display.clone(),
            source,
        })?;
        let key = content.trim();
        if key.is_empty() {
            return Err(SecretError::EmptyFile { path: display });
        }
        return Ok(SecretString::from(key.to_string()));
    }

    if let Some(name) = non_blank(env_var) {
        return match std::env::var(name) {
            Ok(value) if !value.trim().is_empty() => Ok(SecretString::from(value.trim().to_string())),
            Ok(_) | Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                name: name.to_string(),
            }),
            Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                name: name.to_string(),
            }),
        };
    }

    Err(SecretError::NoSourceProvided)
}

/// Whether any source is configured at all. Used by config validation to
/// warn early instead of failing on the first upload.
pub fn has_secret_source(direct: Option<&str>, file_path: Option<&str>, env_var: Option<&str>) -> bool {
    non_blank(direct).is_some() || non_blank(file_path).is_some() || non_blank(env_var).is_some()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Expands a leading `~` or `~/` using the platform home directory.
fn expand_home(path: &str) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/")
    };

    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
