//! Cron dispatch trigger.

use axum::{extract::State, Json};
use chrono::Utc;
use domain::services::DispatchSummary;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CronAuth;
use crate::services::dispatch;

/// Push every slot that is due now.
///
/// GET|POST /api/v1/cron/dispatch
pub async fn run_dispatch(
    State(state): State<AppState>,
    _auth: CronAuth,
) -> Result<Json<DispatchSummary>, ApiError> {
    Ok(Json(dispatch::run_dispatch(&state, Utc::now()).await?))
}
