//! Slot endpoint handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::SlotWithQuestions;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::events;

/// GET /api/v1/slots/:slot_id
pub async fn get_slot(
    State(state): State<AppState>,
    Path(slot_id): Path<Uuid>,
) -> Result<Json<SlotWithQuestions>, ApiError> {
    Ok(Json(events::get_slot(&state, slot_id).await?))
}
