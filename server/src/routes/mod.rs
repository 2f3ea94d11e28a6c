//! HTTP routes.
//!
//! Routes are organized by domain:
//! - `invoices`: single-file analysis, history, lookup, deletion
//! - `batches`: multi-file intake
//! - `insights`: dashboard and vendor profiles
//!
//! | Method | Path | |
//! |--------|------|-|
//! | `GET` | `/health` | version check |
//! | `GET` | `/api/dashboard` | totals, health, recent invoices, monthly chart |
//! | `POST` | `/api/invoices/analyze` | analyze and save one uploaded file |
//! | `GET` / `DELETE` | `/api/invoices` | history / clear history |
//! | `GET` / `DELETE` | `/api/invoices/{id}` | one record |
//! | `POST` | `/api/batches` | run a batch over the uploaded files |
//! | `GET` | `/api/batches/events` | server-sent progress events |
//! | `GET` | `/api/vendors/{name}` | vendor trust profile |

mod batches;
mod insights;
mod invoices;

use axum::extract::multipart::Multipart;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use invoicewatch::analyzer::Document;
use log::info;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::error::AppError;
use crate::events;
use crate::state::AppState;

/// Upper bound for one request body, all files included.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/dashboard", get(insights::dashboard))
        .route("/api/invoices/analyze", post(invoices::analyze))
        .route(
            "/api/invoices",
            get(invoices::history).delete(invoices::delete_all),
        )
        .route(
            "/api/invoices/{id}",
            get(invoices::get_one).delete(invoices::delete_one),
        )
        .route("/api/batches", post(batches::run))
        .route("/api/batches/events", get(events::batch_events))
        .route("/api/vendors/{name}", get(insights::vendor))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(bind: &str, state: AppState) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Listening on http://{}", bind);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Collects every file part of a multipart upload, in submission order.
/// Parts without a file name are ignored.
async fn read_documents(mut multipart: Multipart) -> Result<Vec<Document>, AppError> {
    let mut documents = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Malformed upload: {}", e)))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let mime_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(format!("Failed to read '{}': {}", file_name, e)))?;

        documents.push(Document::with_mime_type(file_name, mime_type, bytes.to_vec()));
    }

    Ok(documents)
}
