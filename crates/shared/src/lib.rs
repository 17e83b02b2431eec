//! Shared utilities for the Experience Loop backend.
//!
//! - Event password hashing with Argon2id
//! - Content hashing for uploaded media
//! - Common validation logic

pub mod crypto;
pub mod password;
pub mod validation;
