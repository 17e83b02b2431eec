//! Slot and question repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::slot::SlotPlan;
use domain::services::DispatchWindow;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{DueSlotEntity, QuestionEntity, QuestionKindDb, SlotEntity, SlotTypeDb};
use crate::metrics::QueryTimer;

const SLOT_COLUMNS: &str =
    "id, event_id, t_at, title, description, type, order_idx, dispatched_at, announce, created_at";

const QUESTION_COLUMNS: &str = "id, slot_id, text, kind, required, order_idx, created_at";

/// Repository for slot and question database operations.
#[derive(Clone)]
pub struct SlotRepository {
    pool: PgPool,
}

/// Inserts one slot and its questions on the given connection.
async fn insert_plan(
    conn: &mut PgConnection,
    plan: &SlotPlan,
) -> Result<(SlotEntity, Vec<QuestionEntity>), sqlx::Error> {
    let slot = sqlx::query_as::<_, SlotEntity>(&format!(
        r#"
        INSERT INTO slots (event_id, t_at, title, description, type, order_idx, announce)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {SLOT_COLUMNS}
        "#
    ))
    .bind(plan.slot.event_id)
    .bind(plan.slot.t_at)
    .bind(&plan.slot.title)
    .bind(&plan.slot.description)
    .bind(SlotTypeDb::from(plan.slot.slot_type))
    .bind(plan.slot.order_idx)
    .bind(&plan.slot.announce)
    .fetch_one(&mut *conn)
    .await?;

    let mut questions = Vec::with_capacity(plan.questions.len());
    for q in &plan.questions {
        let question = sqlx::query_as::<_, QuestionEntity>(&format!(
            r#"
            INSERT INTO questions (slot_id, text, kind, required, order_idx)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {QUESTION_COLUMNS}
            "#
        ))
        .bind(slot.id)
        .bind(&q.text)
        .bind(QuestionKindDb::from(q.kind))
        .bind(q.required)
        .bind(q.order_idx)
        .fetch_one(&mut *conn)
        .await?;
        questions.push(question);
    }

    Ok((slot, questions))
}

impl SlotRepository {
    /// Creates a new SlotRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one slot with its questions in a single transaction.
    pub async fn create(
        &self,
        plan: &SlotPlan,
    ) -> Result<(SlotEntity, Vec<QuestionEntity>), sqlx::Error> {
        let timer = QueryTimer::new("create_slot");
        let mut tx = self.pool.begin().await?;
        let created = insert_plan(&mut *tx, plan).await?;
        tx.commit().await?;
        timer.record();
        Ok(created)
    }

    /// Delete every slot of an event and insert the new plan, atomically.
    /// Questions and answers of deleted slots go with them (ON DELETE CASCADE).
    pub async fn replace_for_event(
        &self,
        event_id: Uuid,
        plans: &[SlotPlan],
    ) -> Result<Vec<(SlotEntity, Vec<QuestionEntity>)>, sqlx::Error> {
        let timer = QueryTimer::new("replace_schedule");
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM slots WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;

        let mut created = Vec::with_capacity(plans.len());
        for plan in plans {
            created.push(insert_plan(&mut *tx, plan).await?);
        }

        tx.commit().await?;
        timer.record();
        Ok(created)
    }

    /// Slots of an event ordered by `order_idx`.
    pub async fn list_for_event(&self, event_id: Uuid) -> Result<Vec<SlotEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_slots");
        let result = sqlx::query_as::<_, SlotEntity>(&format!(
            "SELECT {SLOT_COLUMNS} FROM slots WHERE event_id = $1 ORDER BY order_idx ASC, t_at ASC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, slot_id: Uuid) -> Result<Option<SlotEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_slot_by_id");
        let result = sqlx::query_as::<_, SlotEntity>(&format!(
            "SELECT {SLOT_COLUMNS} FROM slots WHERE id = $1"
        ))
        .bind(slot_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Questions of the given slots, in authored order within each slot.
    pub async fn questions_for_slots(
        &self,
        slot_ids: &[Uuid],
    ) -> Result<Vec<QuestionEntity>, sqlx::Error> {
        if slot_ids.is_empty() {
            return Ok(Vec::new());
        }
        let timer = QueryTimer::new("questions_for_slots");
        let result = sqlx::query_as::<_, QuestionEntity>(&format!(
            r#"
            SELECT {QUESTION_COLUMNS}
            FROM questions
            WHERE slot_id = ANY($1)
            ORDER BY slot_id, order_idx ASC
            "#
        ))
        .bind(slot_ids)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Pending ask slots inside the window, joined with their event.
    pub async fn find_due(&self, window: DispatchWindow) -> Result<Vec<DueSlotEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_due_slots");
        let result = sqlx::query_as::<_, DueSlotEntity>(
            r#"
            SELECT s.id, s.event_id, s.t_at, s.title, s.description, s.type, s.order_idx,
                   s.dispatched_at, s.announce, s.created_at,
                   e.code AS event_code, e.name AS event_name
            FROM slots s
            JOIN events e ON e.id = s.event_id
            WHERE s.type = 'ask'
              AND s.dispatched_at IS NULL
              AND s.t_at >= $1
              AND s.t_at <= $2
            ORDER BY s.t_at ASC
            "#,
        )
        .bind(window.from)
        .bind(window.until)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Conditionally mark a slot dispatched. Returns whether this call won.
    pub async fn claim_dispatch(
        &self,
        slot_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("claim_slot_dispatch");
        let result = sqlx::query(
            r#"
            UPDATE slots
            SET dispatched_at = $2
            WHERE id = $1 AND dispatched_at IS NULL
            "#,
        )
        .bind(slot_id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() == 1)
    }
}
