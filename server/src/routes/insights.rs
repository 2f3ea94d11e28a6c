//! Dashboard and vendor profile views, derived from stored records.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use invoicewatch::metrics::{DashboardSummary, VendorProfile};
use invoicewatch::store::{RecordStore, RiskSummary};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub summary: DashboardSummary,
    pub risk_breakdown: RiskSummary,
}

/// `GET /api/dashboard`
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>, AppError> {
    let owner_id = state.owner_id();
    let records = state.store().list_by_owner(owner_id, None).await?;
    let risk_breakdown = state.store().risk_summary(owner_id).await?;

    Ok(Json(DashboardResponse {
        summary: DashboardSummary::build(&records, Utc::now().date_naive()),
        risk_breakdown,
    }))
}

/// `GET /api/vendors/{name}`
pub async fn vendor(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<VendorProfile>, AppError> {
    let records = state.store().list_by_vendor(state.owner_id(), &name).await?;
    VendorProfile::from_records(&name, records)
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("No invoices from vendor {}", name)))
}
