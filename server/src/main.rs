//! invoicewatch HTTP server.
//!
//! Reads its configuration from the path given as an argument, or from
//! `INVOICEWATCH_CONFIG`, and falls back to built-in defaults.
//!
//! `--check-models` lists the analyzer models the configured key can use
//! for content generation, then exits without serving.

mod error;
mod events;
mod routes;
mod state;

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use invoicewatch::analyzer::{DocumentAnalyzer, GeminiAnalyzer, ResilientAnalyzer};
use invoicewatch::config::{load_config, Config};
use invoicewatch::db::Database;
use invoicewatch::store::{RecordStore, SqliteRecordStore};
use invoicewatch::telemetry::init_tracing;
use log::info;

use state::AppState;

const CONFIG_ENV_VAR: &str = "INVOICEWATCH_CONFIG";
const CHECK_MODELS_FLAG: &str = "--check-models";

#[derive(Debug, Default, PartialEq)]
struct Options {
    config: Option<PathBuf>,
    check_models: bool,
}

impl Options {
    fn parse(args: impl IntoIterator<Item = OsString>, env_config: Option<OsString>) -> Self {
        let mut options = Options::default();
        for arg in args {
            if arg == CHECK_MODELS_FLAG {
                options.check_models = true;
            } else if options.config.is_none() {
                options.config = Some(PathBuf::from(arg));
            }
        }
        if options.config.is_none() {
            options.config = env_config.map(PathBuf::from);
        }
        options
    }
}

async fn check_models(analyzer: &GeminiAnalyzer) -> anyhow::Result<()> {
    let models = analyzer
        .list_models()
        .await
        .context("Failed to list analyzer models")?;
    let configured = format!("models/{}", analyzer.model());

    println!("Models supporting generateContent:");
    for name in &models {
        let marker = if *name == configured { " (configured)" } else { "" };
        println!("  {}{}", name, marker);
    }
    if !models.contains(&configured) {
        println!("Configured model {} is not in this list", analyzer.model());
    }
    Ok(())
}

fn load(path: Option<PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => load_config(&path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = Options::parse(
        std::env::args_os().skip(1),
        std::env::var_os(CONFIG_ENV_VAR),
    );
    let path = options.config;
    let config = load(path.clone())?;
    init_tracing(&config.logging);

    if options.check_models {
        let gemini = GeminiAnalyzer::from_config(&config.analyzer)
            .context("Failed to set up the document analyzer")?;
        return check_models(&gemini).await;
    }

    info!("Starting invoicewatch-server v{}", env!("CARGO_PKG_VERSION"));
    match &path {
        Some(path) => info!("Using config file {:?}", path),
        None => info!("No config file given, using defaults"),
    }

    let db_path = config.database_path()?;
    info!("Opening database at {:?}", db_path);
    let db = Database::open(&db_path).context("Failed to open database")?;
    let store = SqliteRecordStore::new(db);

    let owner = config.owner.to_owner();
    if store.ensure_owner(&owner).await? {
        info!("Created owner {}", owner.id);
    }

    let gemini = GeminiAnalyzer::from_config(&config.analyzer)
        .context("Failed to set up the document analyzer")?;
    info!("Analyzer model: {}", gemini.model());
    let analyzer: Arc<dyn DocumentAnalyzer> =
        Arc::new(ResilientAnalyzer::from_config(gemini, &config.analyzer));

    let state = AppState::new(analyzer, store, owner, &config.currency);
    routes::serve(&config.server.bind, state).await
}
