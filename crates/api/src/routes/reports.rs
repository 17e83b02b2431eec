//! Report endpoint handlers.

use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};
use domain::models::report::{
    BatchReportResponse, GenerateReportRequest, GenerateReportResponse, ReportDetails,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ApiJson;
use crate::services::reports;

/// Generate (or regenerate) one participant's report.
///
/// POST /api/v1/reports/generate
pub async fn generate_report(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GenerateReportRequest>,
) -> Result<Json<GenerateReportResponse>, ApiError> {
    Ok(Json(reports::generate_report(&state, request).await?))
}

/// Generate reports for every participant of an event.
///
/// POST /api/v1/events/:code/reports/generate
pub async fn generate_event_reports(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<BatchReportResponse>, ApiError> {
    Ok(Json(reports::generate_event_reports(&state, &code).await?))
}

/// GET /api/v1/reports/:participant_id
pub async fn get_report(
    State(state): State<AppState>,
    Path(participant_id): Path<Uuid>,
) -> Result<Json<ReportDetails>, ApiError> {
    Ok(Json(reports::report_details(&state, participant_id).await?))
}

/// GET /api/v1/reports/:participant_id/view
pub async fn view_report(
    State(state): State<AppState>,
    Path(participant_id): Path<Uuid>,
) -> Result<Html<String>, ApiError> {
    Ok(Html(reports::render_report_view(&state, participant_id).await?))
}
