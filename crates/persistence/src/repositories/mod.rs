//! Repository implementations for database operations.

pub mod answer;
pub mod event;
pub mod notification;
pub mod participant;
pub mod report;
pub mod slot;

pub use answer::AnswerRepository;
pub use event::EventRepository;
pub use notification::NotificationRepository;
pub use participant::ParticipantRepository;
pub use report::ReportRepository;
pub use slot::SlotRepository;
