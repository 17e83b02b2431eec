//! Participant repository for database operations.

use domain::models::participant::NewParticipant;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ParticipantEntity;
use crate::metrics::QueryTimer;

/// Repository for participant database operations.
#[derive(Clone)]
pub struct ParticipantRepository {
    pool: PgPool,
}

impl ParticipantRepository {
    /// Creates a new ParticipantRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: &NewParticipant) -> Result<ParticipantEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_participant");
        let sub = new.push_subscription.as_ref();
        let result = sqlx::query_as::<_, ParticipantEntity>(
            r#"
            INSERT INTO participants (event_id, nickname, team, push_endpoint, p256dh, auth)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, event_id, nickname, team, push_endpoint, p256dh, auth, created_at
            "#,
        )
        .bind(new.event_id)
        .bind(&new.nickname)
        .bind(&new.team)
        .bind(sub.map(|s| s.endpoint.as_str()))
        .bind(sub.map(|s| s.p256dh.as_str()))
        .bind(sub.map(|s| s.auth.as_str()))
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ParticipantEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_participant_by_id");
        let result = sqlx::query_as::<_, ParticipantEntity>(
            r#"
            SELECT id, event_id, nickname, team, push_endpoint, p256dh, auth, created_at
            FROM participants
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Participants of an event in join order.
    pub async fn list_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<ParticipantEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_participants");
        let result = sqlx::query_as::<_, ParticipantEntity>(
            r#"
            SELECT id, event_id, nickname, team, push_endpoint, p256dh, auth, created_at
            FROM participants
            WHERE event_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
