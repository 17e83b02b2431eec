//! Custom Axum extractors.
//!
//! Extractors for parsing and validating request data.

pub mod cron_auth;
pub mod forms;
pub mod json;

pub use cron_auth::CronAuth;
pub use forms::{AnswerForm, EventForm};
pub use json::ApiJson;
