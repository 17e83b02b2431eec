//! Event endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::event::{
    CreateEventResponse, EventWithSlots, ListEventsResponse, PasswordRequest,
    PublishEventResponse, ReplaceScheduleRequest, ReplaceScheduleResponse,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, EventForm};
use crate::services::events;

/// Create a draft event with its schedule.
///
/// POST /api/v1/events
///
/// Accepts JSON or multipart with a `document` file part.
pub async fn create_event(
    State(state): State<AppState>,
    form: EventForm,
) -> Result<(StatusCode, Json<CreateEventResponse>), ApiError> {
    let response = events::create_event(&state, form.request, form.document).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// List all events, newest first.
///
/// GET /api/v1/events
pub async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<ListEventsResponse>, ApiError> {
    Ok(Json(events::list_events(&state).await?))
}

/// Get an event with its slots and questions.
///
/// GET /api/v1/events/:code
pub async fn get_event(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<EventWithSlots>, ApiError> {
    Ok(Json(events::get_event(&state, &code).await?))
}

/// Publish a draft event.
///
/// POST /api/v1/events/:code/publish
pub async fn publish_event(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ApiJson(request): ApiJson<PasswordRequest>,
) -> Result<Json<PublishEventResponse>, ApiError> {
    Ok(Json(events::publish_event(&state, &code, request).await?))
}

/// Replace the whole schedule of an event.
///
/// PUT /api/v1/events/:code/slots
pub async fn replace_slots(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ApiJson(request): ApiJson<ReplaceScheduleRequest>,
) -> Result<Json<ReplaceScheduleResponse>, ApiError> {
    Ok(Json(events::replace_schedule(&state, &code, request).await?))
}
