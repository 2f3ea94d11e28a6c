//! Batch intake over uploaded files.

use axum::extract::multipart::Multipart;
use axum::extract::State;
use axum::Json;
use invoicewatch::intake::{BatchJob, BatchReport, BroadcastProgress};

use super::read_documents;
use crate::error::AppError;
use crate::state::AppState;

/// `POST /api/batches`: runs every uploaded file through the pipeline in
/// upload order and returns the report once the last file is done.
/// Progress is published on `/api/batches/events` while it runs.
pub async fn run(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<BatchReport>, AppError> {
    let Ok(_guard) = state.batch_lock.clone().try_lock_owned() else {
        return Err(AppError::conflict("Another batch is still running"));
    };

    let documents = read_documents(multipart).await?;
    let mut job = BatchJob::new(documents);
    let progress = BroadcastProgress::new(&state.progress, job.id(), job.total());

    let report = state.pipeline.run_batch(&mut job, &progress).await;
    tracing::info!(
        batch_id = %report.batch_id,
        saved = report.saved_count(),
        failed = report.failures.len(),
        high_risk = report.high_risk_count(),
        "Batch finished"
    );
    Ok(Json(report))
}
