//! Participant endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::participant::{JoinRequest, JoinResponse};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ApiJson;
use crate::services::participants;

/// Join a published event.
///
/// POST /api/v1/join
pub async fn join(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<JoinRequest>,
) -> Result<(StatusCode, Json<JoinResponse>), ApiError> {
    let response = participants::join(&state, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
