//! Notification audit records and message templates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Kind of notification sent to an event's participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    SlotStart,
    SlotReminder,
    SlotEnd,
    EventEnd,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::SlotStart => write!(f, "slot_start"),
            NotificationType::SlotReminder => write!(f, "slot_reminder"),
            NotificationType::SlotEnd => write!(f, "slot_end"),
            NotificationType::EventEnd => write!(f, "event_end"),
        }
    }
}

impl std::str::FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "slot_start" => Ok(NotificationType::SlotStart),
            "slot_reminder" => Ok(NotificationType::SlotReminder),
            "slot_end" => Ok(NotificationType::SlotEnd),
            "event_end" => Ok(NotificationType::EventEnd),
            other => Err(format!("Unknown notification type: {}", other)),
        }
    }
}

impl NotificationType {
    /// Whether this type is about a specific slot.
    pub fn requires_slot(&self) -> bool {
        !matches!(self, NotificationType::EventEnd)
    }

    /// Fixed title and message for this notification type.
    pub fn render(&self, event_name: &str, slot_title: Option<&str>) -> (String, String) {
        let slot = slot_title.unwrap_or(event_name);
        match self {
            NotificationType::SlotStart => (
                format!("🎯 {} has started!", slot),
                format!("It's time for {}. Please answer the questions!", slot),
            ),
            NotificationType::SlotReminder => (
                format!("⏰ {} in progress", slot),
                format!("{} is in progress. Don't forget to answer!", slot),
            ),
            NotificationType::SlotEnd => (
                format!("🏁 {} closed", slot),
                format!("{} has closed. Please finish submitting your answers.", slot),
            ),
            NotificationType::EventEnd => (
                format!("🎉 {} has ended", event_name),
                "The event has ended. Check out your personal report!".to_string(),
            ),
        }
    }
}

/// Audit record of a dispatched push. Not a delivery guarantee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub event_id: Uuid,
    pub slot_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub delivered: i32,
    pub failed: i32,
    pub sent_at: DateTime<Utc>,
}

/// Data needed to insert an audit record.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub event_id: Uuid,
    pub slot_id: Option<Uuid>,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub delivered: i32,
    pub failed: i32,
}

/// Request to push an explicit notification.
///
/// `notification_type` is kept as a string so an unknown value is reported as
/// a validation error rather than a body parse failure.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendNotificationRequest {
    #[serde(alias = "eventCode")]
    #[validate(length(min = 1, message = "event_code is required"))]
    pub event_code: String,

    #[serde(default, alias = "slotId")]
    pub slot_id: Option<Uuid>,

    #[serde(alias = "notificationType")]
    #[validate(length(min = 1, message = "notification_type is required"))]
    pub notification_type: String,
}

/// Response after pushing an explicit notification.
#[derive(Debug, Clone, Serialize)]
pub struct SendNotificationResponse {
    pub notification_id: Uuid,
    pub title: String,
    pub message: String,
    pub recipients: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Query for listing an event's notifications.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationListQuery {
    #[serde(alias = "eventCode")]
    pub event_code: String,
}

/// Response for listing notifications.
#[derive(Debug, Clone, Serialize)]
pub struct ListNotificationsResponse {
    pub event_code: String,
    pub data: Vec<Notification>,
    pub total: usize,
}
