//! Domain services for Experience Loop.
//!
//! Collaborator seams and pure logic shared by the API layer.

pub mod dispatch;
pub mod generator;
pub mod push;
pub mod report_render;

pub use dispatch::{slot_message, DispatchSummary, DispatchWindow};
pub use generator::{
    AnswerSummary, AudioClip, ContentGenerator, GeneratorError, PlaceholderGenerator,
    ProposedSchedule,
};
pub use push::{
    BulkDeliveryReport, DeliveryOutcome, MockPushService, PushError, PushMessage, PushService,
};
pub use report_render::{render_report_html, ReportHeader};
