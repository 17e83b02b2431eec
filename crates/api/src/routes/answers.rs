//! Answer endpoint handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use domain::models::answer::{AnswerListQuery, ListAnswersResponse, SubmitAnswersResponse};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AnswerForm;
use crate::services::answers;

/// Submit a batch of answers for one slot.
///
/// POST /api/v1/answers
///
/// Returns 400 when no answer in the batch could be saved.
pub async fn submit_answers(
    State(state): State<AppState>,
    AnswerForm(request): AnswerForm,
) -> Result<(StatusCode, Json<SubmitAnswersResponse>), ApiError> {
    let response = answers::submit_answers(&state, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// List answers.
///
/// GET /api/v1/answers?eventCode=&participantId=
pub async fn list_answers(
    State(state): State<AppState>,
    Query(query): Query<AnswerListQuery>,
) -> Result<Json<ListAnswersResponse>, ApiError> {
    Ok(Json(answers::list_answers(&state, query).await?))
}
