//! Storage seam used by the API layer.
//!
//! One trait, two backends: `PgStore` for production and `MemoryStore` for
//! local runs and tests. The backend is chosen by configuration.

use chrono::{DateTime, Utc};
use domain::models::answer::{AnswerFilter, AnswerWithContext, NewAnswer};
use domain::models::event::NewEvent;
use domain::models::notification::NewNotification;
use domain::models::participant::NewParticipant;
use domain::models::report::NewReport;
use domain::models::slot::SlotPlan;
use domain::models::{Answer, Event, Notification, Participant, Report, Slot, SlotWithQuestions};
use domain::services::DispatchWindow;
use thiserror::Error;
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Event code already exists: {0}")]
    DuplicateCode(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Stored data is malformed: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A slot found by the dispatch scan, with the event fields needed to build
/// the push message.
#[derive(Debug, Clone)]
pub struct DueSlot {
    pub slot: Slot,
    pub event_code: String,
    pub event_name: String,
}

/// Persistent store for events and everything hanging off them.
#[async_trait::async_trait]
pub trait EventStore: Send + Sync {
    /// Backend name for logs and metrics.
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), StoreError>;

    /// Inserts a draft event. Fails with `DuplicateCode` if the code is taken.
    async fn create_event(&self, new: NewEvent) -> Result<Event, StoreError>;

    /// Exact, case-sensitive lookup.
    async fn find_event_by_code(&self, code: &str) -> Result<Option<Event>, StoreError>;

    async fn find_event_by_id(&self, id: Uuid) -> Result<Option<Event>, StoreError>;

    /// All events, newest first.
    async fn list_events(&self) -> Result<Vec<Event>, StoreError>;

    /// Moves a draft event to published. Already published events are
    /// returned unchanged.
    async fn publish_event(&self, id: Uuid, at: DateTime<Utc>) -> Result<Event, StoreError>;

    /// Inserts one slot with its questions.
    async fn create_slot(&self, plan: SlotPlan) -> Result<SlotWithQuestions, StoreError>;

    /// Deletes every slot of the event and inserts `plans` in their place.
    async fn replace_schedule(
        &self,
        event_id: Uuid,
        plans: Vec<SlotPlan>,
    ) -> Result<Vec<SlotWithQuestions>, StoreError>;

    /// Slots of an event ordered by `order_idx`.
    async fn list_slots(&self, event_id: Uuid) -> Result<Vec<SlotWithQuestions>, StoreError>;

    async fn find_slot(&self, slot_id: Uuid) -> Result<Option<SlotWithQuestions>, StoreError>;

    /// Pending ask slots scheduled inside `window`, earliest first.
    async fn find_due_slots(&self, window: DispatchWindow) -> Result<Vec<DueSlot>, StoreError>;

    /// Marks a slot dispatched if nobody has yet. Returns `false` when another
    /// run got there first.
    async fn claim_slot_dispatch(&self, slot_id: Uuid, at: DateTime<Utc>)
        -> Result<bool, StoreError>;

    async fn create_participant(&self, new: NewParticipant) -> Result<Participant, StoreError>;

    async fn find_participant(&self, id: Uuid) -> Result<Option<Participant>, StoreError>;

    async fn list_participants(&self, event_id: Uuid) -> Result<Vec<Participant>, StoreError>;

    async fn create_answer(&self, new: NewAnswer) -> Result<Answer, StoreError>;

    /// Answers with slot and question context, oldest first.
    async fn list_answers(&self, filter: AnswerFilter)
        -> Result<Vec<AnswerWithContext>, StoreError>;

    /// Inserts or replaces the participant's report.
    async fn upsert_report(&self, new: NewReport) -> Result<Report, StoreError>;

    async fn find_report_by_participant(
        &self,
        participant_id: Uuid,
    ) -> Result<Option<Report>, StoreError>;

    async fn create_notification(&self, new: NewNotification) -> Result<Notification, StoreError>;

    /// Audit rows of an event, newest first.
    async fn list_notifications(&self, event_id: Uuid) -> Result<Vec<Notification>, StoreError>;
}
