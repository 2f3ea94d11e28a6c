//! Single-file analysis and invoice history.

use axum::extract::multipart::Multipart;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use invoicewatch::analyzer::Document;
use invoicewatch::store::{InvoiceRecord, RecordStore};
use serde::{Deserialize, Serialize};

use super::read_documents;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}

/// `POST /api/invoices/analyze`: analyze and save exactly one file.
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<InvoiceRecord>), AppError> {
    let document = match <[Document; 1]>::try_from(read_documents(multipart).await?) {
        Ok([document]) => document,
        Err(documents) => {
            return Err(AppError::bad_request(format!(
                "Expected exactly one file, got {}",
                documents.len()
            )))
        }
    };

    let record = state.pipeline.analyze_and_save(&document).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/invoices`: newest first.
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<InvoiceRecord>>, AppError> {
    let records = state
        .store()
        .list_by_owner(state.owner_id(), query.limit)
        .await?;
    Ok(Json(records))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InvoiceRecord>, AppError> {
    state
        .store()
        .get(state.owner_id(), &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Invoice {} not found", id)))
}

pub async fn delete_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.store().delete(state.owner_id(), &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("Invoice {} not found", id)))
    }
}

/// `DELETE /api/invoices`: clears the owner's whole history.
pub async fn delete_all(State(state): State<AppState>) -> Result<Json<DeletedResponse>, AppError> {
    let deleted = state.store().delete_all(state.owner_id()).await?;
    tracing::info!(deleted, "Cleared invoice history");
    Ok(Json(DeletedResponse { deleted }))
}
