//! Persistence layer for the Experience Loop backend.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - The `EventStore` seam with Postgres and in-memory backends

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
pub mod store;

pub use store::{DueSlot, EventStore, MemoryStore, PgStore, StoreError};
