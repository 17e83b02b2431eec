//! Postgres-backed store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use domain::models::answer::{AnswerFilter, AnswerWithContext, NewAnswer};
use domain::models::event::NewEvent;
use domain::models::notification::NewNotification;
use domain::models::participant::NewParticipant;
use domain::models::report::NewReport;
use domain::models::slot::SlotPlan;
use domain::models::{
    Answer, Event, Notification, Participant, Question, Report, SlotWithQuestions,
};
use domain::services::DispatchWindow;
use sqlx::PgPool;
use uuid::Uuid;

use super::{DueSlot, EventStore, StoreError};
use crate::entities::{QuestionEntity, ReportEntity, SlotEntity};
use crate::repositories::{
    AnswerRepository, EventRepository, NotificationRepository, ParticipantRepository,
    ReportRepository, SlotRepository,
};

/// Store backed by the repositories over one connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    events: EventRepository,
    slots: SlotRepository,
    participants: ParticipantRepository,
    answers: AnswerRepository,
    reports: ReportRepository,
    notifications: NotificationRepository,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            events: EventRepository::new(pool.clone()),
            slots: SlotRepository::new(pool.clone()),
            participants: ParticipantRepository::new(pool.clone()),
            answers: AnswerRepository::new(pool.clone()),
            reports: ReportRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn attach_questions(
        &self,
        slots: Vec<SlotEntity>,
    ) -> Result<Vec<SlotWithQuestions>, StoreError> {
        let ids: Vec<Uuid> = slots.iter().map(|s| s.id).collect();
        let mut by_slot: HashMap<Uuid, Vec<Question>> = HashMap::new();
        for q in self.slots.questions_for_slots(&ids).await? {
            by_slot.entry(q.slot_id).or_default().push(q.into());
        }

        Ok(slots
            .into_iter()
            .map(|s| SlotWithQuestions {
                questions: by_slot.remove(&s.id).unwrap_or_default(),
                slot: s.into(),
            })
            .collect())
    }
}

fn assemble(slot: SlotEntity, questions: Vec<QuestionEntity>) -> SlotWithQuestions {
    SlotWithQuestions {
        slot: slot.into(),
        questions: questions.into_iter().map(Into::into).collect(),
    }
}

fn decode_report(entity: ReportEntity) -> Result<Report, StoreError> {
    Report::try_from(entity).map_err(|e| StoreError::Corrupt(e.to_string()))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

#[async_trait::async_trait]
impl EventStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        crate::metrics::record_pool_metrics(&self.pool);
        Ok(())
    }

    async fn create_event(&self, new: NewEvent) -> Result<Event, StoreError> {
        match self.events.create(&new).await {
            Ok(entity) => Ok(entity.into()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::DuplicateCode(new.code)),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_event_by_code(&self, code: &str) -> Result<Option<Event>, StoreError> {
        Ok(self.events.find_by_code(code).await?.map(Into::into))
    }

    async fn find_event_by_id(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        Ok(self.events.find_by_id(id).await?.map(Into::into))
    }

    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.events.list().await?.into_iter().map(Into::into).collect())
    }

    async fn publish_event(&self, id: Uuid, at: DateTime<Utc>) -> Result<Event, StoreError> {
        self.events
            .publish(id, at)
            .await?
            .map(Into::into)
            .ok_or(StoreError::NotFound("Event"))
    }

    async fn create_slot(&self, plan: SlotPlan) -> Result<SlotWithQuestions, StoreError> {
        match self.slots.create(&plan).await {
            Ok((slot, questions)) => Ok(assemble(slot, questions)),
            Err(e) if is_foreign_key_violation(&e) => Err(StoreError::NotFound("Event")),
            Err(e) => Err(e.into()),
        }
    }

    async fn replace_schedule(
        &self,
        event_id: Uuid,
        plans: Vec<SlotPlan>,
    ) -> Result<Vec<SlotWithQuestions>, StoreError> {
        let created = self.slots.replace_for_event(event_id, &plans).await?;
        tracing::debug!(event_id = %event_id, slots = created.len(), "Schedule replaced");
        Ok(created
            .into_iter()
            .map(|(slot, questions)| assemble(slot, questions))
            .collect())
    }

    async fn list_slots(&self, event_id: Uuid) -> Result<Vec<SlotWithQuestions>, StoreError> {
        let slots = self.slots.list_for_event(event_id).await?;
        self.attach_questions(slots).await
    }

    async fn find_slot(&self, slot_id: Uuid) -> Result<Option<SlotWithQuestions>, StoreError> {
        match self.slots.find_by_id(slot_id).await? {
            Some(slot) => Ok(self.attach_questions(vec![slot]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_due_slots(&self, window: DispatchWindow) -> Result<Vec<DueSlot>, StoreError> {
        Ok(self
            .slots
            .find_due(window)
            .await?
            .into_iter()
            .map(|row| DueSlot {
                slot: row.slot.into(),
                event_code: row.event_code,
                event_name: row.event_name,
            })
            .collect())
    }

    async fn claim_slot_dispatch(
        &self,
        slot_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        Ok(self.slots.claim_dispatch(slot_id, at).await?)
    }

    async fn create_participant(&self, new: NewParticipant) -> Result<Participant, StoreError> {
        match self.participants.create(&new).await {
            Ok(entity) => Ok(entity.into()),
            Err(e) if is_foreign_key_violation(&e) => Err(StoreError::NotFound("Event")),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_participant(&self, id: Uuid) -> Result<Option<Participant>, StoreError> {
        Ok(self.participants.find_by_id(id).await?.map(Into::into))
    }

    async fn list_participants(&self, event_id: Uuid) -> Result<Vec<Participant>, StoreError> {
        Ok(self
            .participants
            .list_for_event(event_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn create_answer(&self, new: NewAnswer) -> Result<Answer, StoreError> {
        match self.answers.create(&new).await {
            Ok(entity) => Ok(entity.into()),
            Err(sqlx::Error::RowNotFound) => Err(StoreError::NotFound("Question")),
            Err(e) if is_foreign_key_violation(&e) => Err(StoreError::NotFound("Participant")),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_answers(
        &self,
        filter: AnswerFilter,
    ) -> Result<Vec<AnswerWithContext>, StoreError> {
        Ok(self
            .answers
            .list(&filter)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn upsert_report(&self, new: NewReport) -> Result<Report, StoreError> {
        let content =
            serde_json::to_value(&new.content).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let entity = self.reports.upsert(&new, content).await?;
        decode_report(entity)
    }

    async fn find_report_by_participant(
        &self,
        participant_id: Uuid,
    ) -> Result<Option<Report>, StoreError> {
        self.reports
            .find_by_participant(participant_id)
            .await?
            .map(decode_report)
            .transpose()
    }

    async fn create_notification(
        &self,
        new: NewNotification,
    ) -> Result<Notification, StoreError> {
        Ok(self.notifications.create(&new).await?.into())
    }

    async fn list_notifications(&self, event_id: Uuid) -> Result<Vec<Notification>, StoreError> {
        Ok(self
            .notifications
            .list_for_event(event_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }
}
