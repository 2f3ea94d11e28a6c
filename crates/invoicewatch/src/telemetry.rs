//! Process-wide tracing setup.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::LoggingConfig;

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Builds the filter: `RUST_LOG` when set and valid, else the configured
/// level, else `info`.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber and bridges `log` records into it.
///
/// Returns `false` when a subscriber was already installed, by this function
/// or by someone else.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return false;
    }

    let fmt_layer = if config.json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter(config))
        .with(fmt_layer);

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }

    // The subscriber is in place; a logger set elsewhere only loses `log` records.
    if let Err(e) = tracing_log::LogTracer::init() {
        tracing::debug!(error = %e, "log bridge not installed");
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_filter_falls_back_on_bad_level() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig {
            level: "invoicewatch=loud".to_string(),
            json: false,
        };
        assert_eq!(env_filter(&config).to_string(), "info");
    }

    #[test]
    #[serial]
    fn test_rust_log_overrides_config() {
        std::env::set_var("RUST_LOG", "invoicewatch=trace");
        let config = LoggingConfig {
            level: "warn".to_string(),
            json: false,
        };
        assert_eq!(env_filter(&config).to_string(), "invoicewatch=trace");
        std::env::remove_var("RUST_LOG");
    }

    #[test]
    fn test_second_init_is_noop() {
        let config = LoggingConfig::default();
        init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}
