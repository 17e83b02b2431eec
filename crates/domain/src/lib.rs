//! Domain layer for the Experience Loop backend.
//!
//! This crate contains:
//! - Domain models (Event, Slot, Question, Participant, Answer, Report)
//! - Collaborator seams for content generation and push delivery
//! - Pure scheduling and rendering logic

pub mod models;
pub mod services;
