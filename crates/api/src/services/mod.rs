//! Application services and external integrations.

pub mod access;
pub mod answers;
pub mod dispatch;
pub mod documents;
pub mod events;
pub mod media;
pub mod notifications;
pub mod openai;
pub mod participants;
pub mod reports;
pub mod web_push;

pub use media::MediaStore;
pub use openai::OpenAiGenerator;
pub use web_push::WebPushService;
