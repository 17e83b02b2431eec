//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod answer;
pub mod event;
pub mod notification;
pub mod participant;
pub mod report;
pub mod slot;

pub use answer::{AnswerEntity, AnswerWithContextEntity};
pub use event::{EventEntity, EventStatusDb};
pub use notification::{NotificationEntity, NotificationTypeDb};
pub use participant::ParticipantEntity;
pub use report::ReportEntity;
pub use slot::{DueSlotEntity, QuestionEntity, QuestionKindDb, SlotEntity, SlotTypeDb};
