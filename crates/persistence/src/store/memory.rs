//! In-memory store.
//!
//! All tables live behind a single `RwLock`, so every write operation is
//! serialized and multi-row changes are observed atomically.

use chrono::{DateTime, Utc};
use domain::models::answer::{AnswerFilter, AnswerWithContext, NewAnswer};
use domain::models::event::NewEvent;
use domain::models::notification::NewNotification;
use domain::models::participant::NewParticipant;
use domain::models::report::NewReport;
use domain::models::slot::SlotPlan;
use domain::models::{
    Answer, DispatchState, Event, EventStatus, Notification, Participant, Question, Report,
    Slot, SlotWithQuestions,
};
use domain::services::DispatchWindow;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DueSlot, EventStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    events: Vec<Event>,
    slots: Vec<Slot>,
    questions: Vec<Question>,
    participants: Vec<Participant>,
    answers: Vec<Answer>,
    reports: Vec<Report>,
    notifications: Vec<Notification>,
}

impl Tables {
    fn with_questions(&self, slot: &Slot) -> SlotWithQuestions {
        let mut questions: Vec<Question> = self
            .questions
            .iter()
            .filter(|q| q.slot_id == slot.id)
            .cloned()
            .collect();
        questions.sort_by_key(|q| q.order_idx);
        SlotWithQuestions {
            slot: slot.clone(),
            questions,
        }
    }

    fn insert_plan(&mut self, plan: SlotPlan, now: DateTime<Utc>) -> SlotWithQuestions {
        let slot = Slot {
            id: Uuid::new_v4(),
            event_id: plan.slot.event_id,
            t_at: plan.slot.t_at,
            title: plan.slot.title,
            description: plan.slot.description,
            slot_type: plan.slot.slot_type,
            order_idx: plan.slot.order_idx,
            dispatched_at: None,
            announce: plan.slot.announce,
            created_at: now,
        };
        let questions: Vec<Question> = plan
            .questions
            .into_iter()
            .map(|q| Question {
                id: Uuid::new_v4(),
                slot_id: slot.id,
                text: q.text,
                kind: q.kind,
                required: q.required,
                order_idx: q.order_idx,
                created_at: now,
            })
            .collect();

        self.slots.push(slot.clone());
        self.questions.extend(questions.iter().cloned());
        SlotWithQuestions { slot, questions }
    }

    fn sorted_slots(&self, event_id: Uuid) -> Vec<SlotWithQuestions> {
        let mut slots: Vec<&Slot> = self.slots.iter().filter(|s| s.event_id == event_id).collect();
        slots.sort_by_key(|s| (s.order_idx, s.t_at));
        slots.into_iter().map(|s| self.with_questions(s)).collect()
    }
}

/// Process-local store for development and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl EventStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let _ = self.tables.read().await;
        Ok(())
    }

    async fn create_event(&self, new: NewEvent) -> Result<Event, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.events.iter().any(|e| e.code == new.code) {
            return Err(StoreError::DuplicateCode(new.code));
        }

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            code: new.code,
            password_hash: new.password_hash,
            name: new.name,
            venue: new.venue,
            start_at: new.start_at,
            end_at: new.end_at,
            status: EventStatus::Draft,
            document_url: new.document_url,
            published_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.events.push(event.clone());
        Ok(event)
    }

    async fn find_event_by_code(&self, code: &str) -> Result<Option<Event>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.events.iter().find(|e| e.code == code).cloned())
    }

    async fn find_event_by_id(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.events.iter().find(|e| e.id == id).cloned())
    }

    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        let tables = self.tables.read().await;
        let mut events = tables.events.clone();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }

    async fn publish_event(&self, id: Uuid, at: DateTime<Utc>) -> Result<Event, StoreError> {
        let mut tables = self.tables.write().await;
        let event = tables
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StoreError::NotFound("Event"))?;

        if event.status == EventStatus::Draft {
            event.status = EventStatus::Published;
            event.published_at = Some(at);
            event.updated_at = at;
        }
        Ok(event.clone())
    }

    async fn create_slot(&self, plan: SlotPlan) -> Result<SlotWithQuestions, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.events.iter().any(|e| e.id == plan.slot.event_id) {
            return Err(StoreError::NotFound("Event"));
        }
        Ok(tables.insert_plan(plan, Utc::now()))
    }

    async fn replace_schedule(
        &self,
        event_id: Uuid,
        plans: Vec<SlotPlan>,
    ) -> Result<Vec<SlotWithQuestions>, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.events.iter().any(|e| e.id == event_id) {
            return Err(StoreError::NotFound("Event"));
        }

        let removed: Vec<Uuid> = tables
            .slots
            .iter()
            .filter(|s| s.event_id == event_id)
            .map(|s| s.id)
            .collect();

        // Same cascade rules as the relational schema.
        tables.slots.retain(|s| s.event_id != event_id);
        tables.questions.retain(|q| !removed.contains(&q.slot_id));
        tables.answers.retain(|a| !removed.contains(&a.slot_id));
        for n in tables.notifications.iter_mut() {
            if n.slot_id.map(|id| removed.contains(&id)).unwrap_or(false) {
                n.slot_id = None;
            }
        }

        let now = Utc::now();
        Ok(plans
            .into_iter()
            .map(|plan| tables.insert_plan(plan, now))
            .collect())
    }

    async fn list_slots(&self, event_id: Uuid) -> Result<Vec<SlotWithQuestions>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.sorted_slots(event_id))
    }

    async fn find_slot(&self, slot_id: Uuid) -> Result<Option<SlotWithQuestions>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .slots
            .iter()
            .find(|s| s.id == slot_id)
            .map(|s| tables.with_questions(s)))
    }

    async fn find_due_slots(&self, window: DispatchWindow) -> Result<Vec<DueSlot>, StoreError> {
        let tables = self.tables.read().await;
        let mut due: Vec<DueSlot> = tables
            .slots
            .iter()
            .filter(|s| window.is_due(s))
            .filter_map(|s| {
                tables
                    .events
                    .iter()
                    .find(|e| e.id == s.event_id)
                    .map(|e| DueSlot {
                        slot: s.clone(),
                        event_code: e.code.clone(),
                        event_name: e.name.clone(),
                    })
            })
            .collect();
        due.sort_by_key(|d| d.slot.t_at);
        Ok(due)
    }

    async fn claim_slot_dispatch(
        &self,
        slot_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.slots.iter_mut().find(|s| s.id == slot_id) {
            Some(slot) if slot.dispatch_state() == DispatchState::Pending => {
                slot.dispatched_at = Some(at);
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(StoreError::NotFound("Slot")),
        }
    }

    async fn create_participant(&self, new: NewParticipant) -> Result<Participant, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.events.iter().any(|e| e.id == new.event_id) {
            return Err(StoreError::NotFound("Event"));
        }

        let participant = Participant {
            id: Uuid::new_v4(),
            event_id: new.event_id,
            nickname: new.nickname,
            team: new.team,
            push_subscription: new.push_subscription,
            created_at: Utc::now(),
        };
        tables.participants.push(participant.clone());
        Ok(participant)
    }

    async fn find_participant(&self, id: Uuid) -> Result<Option<Participant>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.participants.iter().find(|p| p.id == id).cloned())
    }

    async fn list_participants(&self, event_id: Uuid) -> Result<Vec<Participant>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .participants
            .iter()
            .filter(|p| p.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn create_answer(&self, new: NewAnswer) -> Result<Answer, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.participants.iter().any(|p| p.id == new.participant_id) {
            return Err(StoreError::NotFound("Participant"));
        }
        if !tables
            .questions
            .iter()
            .any(|q| q.id == new.question_id && q.slot_id == new.slot_id)
        {
            return Err(StoreError::NotFound("Question"));
        }

        let answer = Answer {
            id: Uuid::new_v4(),
            participant_id: new.participant_id,
            slot_id: new.slot_id,
            question_id: new.question_id,
            text: new.text,
            audio_url: new.audio_url,
            photo_url: new.photo_url,
            tags: new.tags,
            summary_2: new.summary_2,
            created_at: Utc::now(),
        };
        tables.answers.push(answer.clone());
        Ok(answer)
    }

    async fn list_answers(
        &self,
        filter: AnswerFilter,
    ) -> Result<Vec<AnswerWithContext>, StoreError> {
        let tables = self.tables.read().await;
        let answers = tables
            .answers
            .iter()
            .filter(|a| filter.participant_id.map_or(true, |id| a.participant_id == id))
            .filter_map(|a| {
                let slot = tables.slots.iter().find(|s| s.id == a.slot_id)?;
                let question = tables.questions.iter().find(|q| q.id == a.question_id)?;
                if filter.event_id.map_or(false, |id| slot.event_id != id) {
                    return None;
                }
                Some(AnswerWithContext {
                    answer: a.clone(),
                    slot_title: slot.title.clone(),
                    slot_order_idx: slot.order_idx,
                    question_text: question.text.clone(),
                    question_kind: question.kind,
                })
            })
            .collect();
        Ok(answers)
    }

    async fn upsert_report(&self, new: NewReport) -> Result<Report, StoreError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        if let Some(existing) = tables
            .reports
            .iter_mut()
            .find(|r| r.participant_id == new.participant_id)
        {
            existing.event_id = new.event_id;
            existing.content = new.content;
            existing.generator = new.generator;
            existing.webview_url = new.webview_url;
            existing.pdf_url = new.pdf_url;
            existing.generated_at = now;
            return Ok(existing.clone());
        }

        let report = Report {
            id: Uuid::new_v4(),
            participant_id: new.participant_id,
            event_id: new.event_id,
            content: new.content,
            generator: new.generator,
            webview_url: new.webview_url,
            pdf_url: new.pdf_url,
            generated_at: now,
        };
        tables.reports.push(report.clone());
        Ok(report)
    }

    async fn find_report_by_participant(
        &self,
        participant_id: Uuid,
    ) -> Result<Option<Report>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .reports
            .iter()
            .find(|r| r.participant_id == participant_id)
            .cloned())
    }

    async fn create_notification(
        &self,
        new: NewNotification,
    ) -> Result<Notification, StoreError> {
        let mut tables = self.tables.write().await;
        let notification = Notification {
            id: Uuid::new_v4(),
            event_id: new.event_id,
            slot_id: new.slot_id,
            notification_type: new.notification_type,
            title: new.title,
            message: new.message,
            delivered: new.delivered,
            failed: new.failed,
            sent_at: Utc::now(),
        };
        tables.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn list_notifications(&self, event_id: Uuid) -> Result<Vec<Notification>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .notifications
            .iter()
            .rev()
            .filter(|n| n.event_id == event_id)
            .cloned()
            .collect())
    }
}
