//! HTTP route handlers.

pub mod answers;
pub mod dispatch;
pub mod events;
pub mod health;
pub mod notifications;
pub mod participants;
pub mod reports;
pub mod slots;
