//! Notification audit repository for database operations.

use domain::models::notification::NewNotification;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{NotificationEntity, NotificationTypeDb};
use crate::metrics::QueryTimer;

/// Repository for notification audit rows.
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Creates a new NotificationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: &NewNotification) -> Result<NotificationEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_notification");
        let result = sqlx::query_as::<_, NotificationEntity>(
            r#"
            INSERT INTO notifications (event_id, slot_id, type, title, message, delivered, failed)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, event_id, slot_id, type, title, message, delivered, failed, sent_at
            "#,
        )
        .bind(new.event_id)
        .bind(new.slot_id)
        .bind(NotificationTypeDb::from(new.notification_type))
        .bind(&new.title)
        .bind(&new.message)
        .bind(new.delivered)
        .bind(new.failed)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Audit rows of an event, newest first.
    pub async fn list_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<NotificationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_notifications");
        let result = sqlx::query_as::<_, NotificationEntity>(
            r#"
            SELECT id, event_id, slot_id, type, title, message, delivered, failed, sent_at
            FROM notifications
            WHERE event_id = $1
            ORDER BY sent_at DESC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
