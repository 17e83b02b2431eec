//! Explicit notifications sent by organizers, and their audit trail.

use domain::models::notification::{
    ListNotificationsResponse, NewNotification, NotificationListQuery, SendNotificationRequest,
    SendNotificationResponse,
};
use domain::models::NotificationType;
use domain::services::dispatch::dashboard_url;
use domain::services::PushMessage;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::access::find_event;
use crate::services::dispatch::subscriptions_of;

/// Pushes a templated notification to every subscribed participant of an
/// event and records it.
pub async fn send_notification(
    state: &AppState,
    request: SendNotificationRequest,
) -> Result<SendNotificationResponse, ApiError> {
    request.validate()?;
    let notification_type: NotificationType =
        request.notification_type.parse().map_err(ApiError::Validation)?;
    let event = find_event(state, &request.event_code).await?;

    let slot = match request.slot_id {
        Some(slot_id) => {
            let slot = state
                .store
                .find_slot(slot_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Slot not found".to_string()))?
                .slot;
            if slot.event_id != event.id {
                return Err(ApiError::Validation(
                    "Slot does not belong to this event".to_string(),
                ));
            }
            Some(slot)
        }
        None if notification_type.requires_slot() => {
            return Err(ApiError::Validation(format!(
                "slot_id is required for {} notifications",
                notification_type
            )));
        }
        None => None,
    };

    let (title, body) = notification_type.render(&event.name, slot.as_ref().map(|s| s.title.as_str()));
    let base_url = &state.config.server.public_base_url;
    let url = match &slot {
        Some(slot) => dashboard_url(base_url, slot.id),
        None => format!("{}/dashboard", base_url.trim_end_matches('/')),
    };
    let message = PushMessage { title, body, url };

    let participants = state.store.list_participants(event.id).await?;
    let subscriptions = subscriptions_of(participants);
    let report = state.push.send_bulk(&subscriptions, &message).await;

    let notification = state
        .store
        .create_notification(NewNotification {
            event_id: event.id,
            slot_id: slot.as_ref().map(|s| s.id),
            notification_type,
            title: message.title,
            message: message.body,
            delivered: report.successful as i32,
            failed: report.failed as i32,
        })
        .await?;

    tracing::info!(
        event_code = %event.code,
        notification_type = %notification_type,
        recipients = report.total,
        delivered = report.successful,
        failed = report.failed,
        "Notification sent"
    );

    Ok(SendNotificationResponse {
        notification_id: notification.id,
        title: notification.title,
        message: notification.message,
        recipients: report.total,
        delivered: report.successful,
        failed: report.failed,
    })
}

pub async fn list_notifications(
    state: &AppState,
    query: NotificationListQuery,
) -> Result<ListNotificationsResponse, ApiError> {
    let event = find_event(state, &query.event_code).await?;
    let data = state.store.list_notifications(event.id).await?;
    Ok(ListNotificationsResponse {
        event_code: event.code,
        total: data.len(),
        data,
    })
}
