//! Event entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::EventStatus;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for event_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "lowercase")]
pub enum EventStatusDb {
    Draft,
    Published,
    Archived,
}

impl From<EventStatusDb> for EventStatus {
    fn from(db: EventStatusDb) -> Self {
        match db {
            EventStatusDb::Draft => EventStatus::Draft,
            EventStatusDb::Published => EventStatus::Published,
            EventStatusDb::Archived => EventStatus::Archived,
        }
    }
}

impl From<EventStatus> for EventStatusDb {
    fn from(status: EventStatus) -> Self {
        match status {
            EventStatus::Draft => EventStatusDb::Draft,
            EventStatus::Published => EventStatusDb::Published,
            EventStatus::Archived => EventStatusDb::Archived,
        }
    }
}

/// Database row mapping for the events table.
#[derive(Debug, Clone, FromRow)]
pub struct EventEntity {
    pub id: Uuid,
    pub code: String,
    pub password_hash: String,
    pub name: String,
    pub venue: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: EventStatusDb,
    pub document_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EventEntity> for domain::models::Event {
    fn from(entity: EventEntity) -> Self {
        Self {
            id: entity.id,
            code: entity.code,
            password_hash: entity.password_hash,
            name: entity.name,
            venue: entity.venue,
            start_at: entity.start_at,
            end_at: entity.end_at,
            status: entity.status.into(),
            document_url: entity.document_url,
            published_at: entity.published_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_status_conversion_both_ways() {
        for status in [EventStatus::Draft, EventStatus::Published, EventStatus::Archived] {
            let db: EventStatusDb = status.into();
            assert_eq!(EventStatus::from(db), status);
        }
    }

    #[test]
    fn test_event_entity_to_domain_keeps_hash() {
        let now = Utc::now();
        let entity = EventEntity {
            id: Uuid::new_v4(),
            code: "HACK2024".to_string(),
            password_hash: "$argon2id$v=19$...".to_string(),
            name: "Hack".to_string(),
            venue: "Seoul".to_string(),
            start_at: now,
            end_at: now,
            status: EventStatusDb::Published,
            document_url: None,
            published_at: Some(now),
            created_at: now,
            updated_at: now,
        };
        let event: domain::models::Event = entity.clone().into();
        assert_eq!(event.code, entity.code);
        assert_eq!(event.password_hash, entity.password_hash);
        assert_eq!(event.status, EventStatus::Published);
    }
}
