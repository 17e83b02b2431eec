//! Notification endpoint handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::notification::{
    ListNotificationsResponse, NotificationListQuery, SendNotificationRequest,
    SendNotificationResponse,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, CronAuth};
use crate::services::notifications;

/// POST /api/v1/notifications/send
///
/// Shares the cron credentials: manual sends reach every subscriber.
pub async fn send_notification(
    _auth: CronAuth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SendNotificationRequest>,
) -> Result<Json<SendNotificationResponse>, ApiError> {
    Ok(Json(notifications::send_notification(&state, request).await?))
}

/// GET /api/v1/notifications?eventCode=
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<ListNotificationsResponse>, ApiError> {
    Ok(Json(notifications::list_notifications(&state, query).await?))
}
