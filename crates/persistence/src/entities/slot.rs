//! Slot and question entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{QuestionKind, SlotType};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for slot_type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "slot_type", rename_all = "lowercase")]
pub enum SlotTypeDb {
    Ask,
    Announce,
}

impl From<SlotTypeDb> for SlotType {
    fn from(db: SlotTypeDb) -> Self {
        match db {
            SlotTypeDb::Ask => SlotType::Ask,
            SlotTypeDb::Announce => SlotType::Announce,
        }
    }
}

impl From<SlotType> for SlotTypeDb {
    fn from(t: SlotType) -> Self {
        match t {
            SlotType::Ask => SlotTypeDb::Ask,
            SlotType::Announce => SlotTypeDb::Announce,
        }
    }
}

/// Database enum for question_kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "question_kind", rename_all = "lowercase")]
pub enum QuestionKindDb {
    Text,
    Audio,
    Photo,
}

impl From<QuestionKindDb> for QuestionKind {
    fn from(db: QuestionKindDb) -> Self {
        match db {
            QuestionKindDb::Text => QuestionKind::Text,
            QuestionKindDb::Audio => QuestionKind::Audio,
            QuestionKindDb::Photo => QuestionKind::Photo,
        }
    }
}

impl From<QuestionKind> for QuestionKindDb {
    fn from(kind: QuestionKind) -> Self {
        match kind {
            QuestionKind::Text => QuestionKindDb::Text,
            QuestionKind::Audio => QuestionKindDb::Audio,
            QuestionKind::Photo => QuestionKindDb::Photo,
        }
    }
}

/// Database row mapping for the slots table.
#[derive(Debug, Clone, FromRow)]
pub struct SlotEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub t_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    #[sqlx(rename = "type")]
    pub slot_type: SlotTypeDb,
    pub order_idx: i32,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub announce: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SlotEntity> for domain::models::Slot {
    fn from(entity: SlotEntity) -> Self {
        Self {
            id: entity.id,
            event_id: entity.event_id,
            t_at: entity.t_at,
            title: entity.title,
            description: entity.description,
            slot_type: entity.slot_type.into(),
            order_idx: entity.order_idx,
            dispatched_at: entity.dispatched_at,
            announce: entity.announce,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the questions table.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionEntity {
    pub id: Uuid,
    pub slot_id: Uuid,
    pub text: String,
    pub kind: QuestionKindDb,
    pub required: bool,
    pub order_idx: i32,
    pub created_at: DateTime<Utc>,
}

impl From<QuestionEntity> for domain::models::Question {
    fn from(entity: QuestionEntity) -> Self {
        Self {
            id: entity.id,
            slot_id: entity.slot_id,
            text: entity.text,
            kind: entity.kind.into(),
            required: entity.required,
            order_idx: entity.order_idx,
            created_at: entity.created_at,
        }
    }
}

/// A due slot joined with its owning event.
#[derive(Debug, Clone, FromRow)]
pub struct DueSlotEntity {
    #[sqlx(flatten)]
    pub slot: SlotEntity,
    pub event_code: String,
    pub event_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_entity_to_domain() {
        let now = Utc::now();
        let entity = SlotEntity {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            t_at: now,
            title: "Kickoff".to_string(),
            description: "Opening".to_string(),
            slot_type: SlotTypeDb::Announce,
            order_idx: 3,
            dispatched_at: None,
            announce: Some("Welcome".to_string()),
            created_at: now,
        };
        let slot: domain::models::Slot = entity.clone().into();
        assert_eq!(slot.slot_type, SlotType::Announce);
        assert_eq!(slot.description, "Opening");
        assert_eq!(slot.order_idx, 3);
    }

    #[test]
    fn test_question_entity_keeps_position() {
        let entity = QuestionEntity {
            id: Uuid::new_v4(),
            slot_id: Uuid::new_v4(),
            text: "What problem?".to_string(),
            kind: QuestionKindDb::Photo,
            required: true,
            order_idx: 2,
            created_at: Utc::now(),
        };
        let question: domain::models::Question = entity.into();
        assert_eq!(question.order_idx, 2);
        assert_eq!(question.kind, QuestionKind::Photo);
    }

    #[test]
    fn test_question_kind_conversion_both_ways() {
        for kind in [QuestionKind::Text, QuestionKind::Audio, QuestionKind::Photo] {
            let db: QuestionKindDb = kind.into();
            assert_eq!(QuestionKind::from(db), kind);
        }
    }
}
