//! Event repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::event::NewEvent;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::EventEntity;
use crate::metrics::QueryTimer;

const EVENT_COLUMNS: &str = "id, code, password_hash, name, venue, start_at, end_at, status, \
                             document_url, published_at, created_at, updated_at";

/// Repository for event-related database operations.
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Creates a new EventRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a draft event. A taken code surfaces as a unique violation.
    pub async fn create(&self, new: &NewEvent) -> Result<EventEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_event");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            INSERT INTO events (code, password_hash, name, venue, start_at, end_at, document_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&new.code)
        .bind(&new.password_hash)
        .bind(&new.name)
        .bind(&new.venue)
        .bind(new.start_at)
        .bind(new.end_at)
        .bind(&new.document_url)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an event by its code (case-sensitive).
    pub async fn find_by_code(&self, code: &str) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_event_by_code");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_event_by_id");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List all events, newest first.
    pub async fn list(&self) -> Result<Vec<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_events");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Publish a draft event. Returns the row whether or not it changed.
    pub async fn publish(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("publish_event");
        sqlx::query(
            r#"
            UPDATE events
            SET status = 'published', published_at = $2, updated_at = $2
            WHERE id = $1 AND status = 'draft'
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        timer.record();

        self.find_by_id(id).await
    }
}
