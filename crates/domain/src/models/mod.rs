//! Domain models for Experience Loop.

pub mod answer;
pub mod event;
pub mod notification;
pub mod participant;
pub mod report;
pub mod slot;

pub use answer::Answer;
pub use event::{Event, EventStatus};
pub use notification::{Notification, NotificationType};
pub use participant::{Participant, PushSubscription};
pub use report::{Report, ReportContent};
pub use slot::{DispatchState, Question, QuestionKind, Slot, SlotType, SlotWithQuestions};
