//! Answer repository for database operations.

use domain::models::answer::{AnswerFilter, NewAnswer};
use sqlx::PgPool;

use crate::entities::{AnswerEntity, AnswerWithContextEntity};
use crate::metrics::QueryTimer;

/// Repository for answer database operations.
#[derive(Clone)]
pub struct AnswerRepository {
    pool: PgPool,
}

impl AnswerRepository {
    /// Creates a new AnswerRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one answer. Resubmissions append.
    pub async fn create(&self, new: &NewAnswer) -> Result<AnswerEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_answer");
        let result = sqlx::query_as::<_, AnswerEntity>(
            r#"
            INSERT INTO answers (participant_id, slot_id, question_id, text, audio_url, photo_url, tags, summary_2)
            SELECT $1, $2, q.id, $4, $5, $6, $7, $8
            FROM questions q
            WHERE q.id = $3 AND q.slot_id = $2
            RETURNING id, participant_id, slot_id, question_id, text, audio_url, photo_url,
                      tags, summary_2, created_at
            "#,
        )
        .bind(new.participant_id)
        .bind(new.slot_id)
        .bind(new.question_id)
        .bind(&new.text)
        .bind(&new.audio_url)
        .bind(&new.photo_url)
        .bind(&new.tags)
        .bind(&new.summary_2)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        // No row means the question does not belong to the slot.
        result?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Answers with slot and question context, oldest first.
    pub async fn list(
        &self,
        filter: &AnswerFilter,
    ) -> Result<Vec<AnswerWithContextEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_answers");
        let result = sqlx::query_as::<_, AnswerWithContextEntity>(
            r#"
            SELECT a.id, a.participant_id, a.slot_id, a.question_id, a.text, a.audio_url,
                   a.photo_url, a.tags, a.summary_2, a.created_at,
                   s.title AS slot_title, s.order_idx AS slot_order_idx,
                   q.text AS question_text, q.kind AS question_kind
            FROM answers a
            JOIN slots s ON s.id = a.slot_id
            JOIN questions q ON q.id = a.question_id
            WHERE ($1::uuid IS NULL OR s.event_id = $1)
              AND ($2::uuid IS NULL OR a.participant_id = $2)
            ORDER BY a.created_at ASC, a.id ASC
            "#,
        )
        .bind(filter.event_id)
        .bind(filter.participant_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
