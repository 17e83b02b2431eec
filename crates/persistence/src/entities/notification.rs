//! Notification entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::NotificationType;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for notification_type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
pub enum NotificationTypeDb {
    SlotStart,
    SlotReminder,
    SlotEnd,
    EventEnd,
}

impl From<NotificationTypeDb> for NotificationType {
    fn from(db: NotificationTypeDb) -> Self {
        match db {
            NotificationTypeDb::SlotStart => NotificationType::SlotStart,
            NotificationTypeDb::SlotReminder => NotificationType::SlotReminder,
            NotificationTypeDb::SlotEnd => NotificationType::SlotEnd,
            NotificationTypeDb::EventEnd => NotificationType::EventEnd,
        }
    }
}

impl From<NotificationType> for NotificationTypeDb {
    fn from(t: NotificationType) -> Self {
        match t {
            NotificationType::SlotStart => NotificationTypeDb::SlotStart,
            NotificationType::SlotReminder => NotificationTypeDb::SlotReminder,
            NotificationType::SlotEnd => NotificationTypeDb::SlotEnd,
            NotificationType::EventEnd => NotificationTypeDb::EventEnd,
        }
    }
}

/// Database row mapping for the notifications table.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub slot_id: Option<Uuid>,
    #[sqlx(rename = "type")]
    pub notification_type: NotificationTypeDb,
    pub title: String,
    pub message: String,
    pub delivered: i32,
    pub failed: i32,
    pub sent_at: DateTime<Utc>,
}

impl From<NotificationEntity> for domain::models::Notification {
    fn from(entity: NotificationEntity) -> Self {
        Self {
            id: entity.id,
            event_id: entity.event_id,
            slot_id: entity.slot_id,
            notification_type: entity.notification_type.into(),
            title: entity.title,
            message: entity.message,
            delivered: entity.delivered,
            failed: entity.failed,
            sent_at: entity.sent_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_type_conversion_both_ways() {
        for t in [
            NotificationType::SlotStart,
            NotificationType::SlotReminder,
            NotificationType::SlotEnd,
            NotificationType::EventEnd,
        ] {
            let db: NotificationTypeDb = t.into();
            assert_eq!(NotificationType::from(db), t);
        }
    }
}
