//! Answer entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::slot::QuestionKindDb;

/// Database row mapping for the answers table.
#[derive(Debug, Clone, FromRow)]
pub struct AnswerEntity {
    pub id: Uuid,
    pub participant_id: Uuid,
    pub slot_id: Uuid,
    pub question_id: Uuid,
    pub text: String,
    pub audio_url: Option<String>,
    pub photo_url: Option<String>,
    pub tags: Vec<String>,
    pub summary_2: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AnswerEntity> for domain::models::Answer {
    fn from(entity: AnswerEntity) -> Self {
        Self {
            id: entity.id,
            participant_id: entity.participant_id,
            slot_id: entity.slot_id,
            question_id: entity.question_id,
            text: entity.text,
            audio_url: entity.audio_url,
            photo_url: entity.photo_url,
            tags: entity.tags,
            summary_2: entity.summary_2,
            created_at: entity.created_at,
        }
    }
}

/// An answer joined with its slot and question.
#[derive(Debug, Clone, FromRow)]
pub struct AnswerWithContextEntity {
    #[sqlx(flatten)]
    pub answer: AnswerEntity,
    pub slot_title: String,
    pub slot_order_idx: i32,
    pub question_text: String,
    pub question_kind: QuestionKindDb,
}

impl From<AnswerWithContextEntity> for domain::models::answer::AnswerWithContext {
    fn from(entity: AnswerWithContextEntity) -> Self {
        Self {
            answer: entity.answer.into(),
            slot_title: entity.slot_title,
            slot_order_idx: entity.slot_order_idx,
            question_text: entity.question_text,
            question_kind: entity.question_kind.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::QuestionKind;

    #[test]
    fn test_answer_with_context_to_domain() {
        let entity = AnswerWithContextEntity {
            answer: AnswerEntity {
                id: Uuid::new_v4(),
                participant_id: Uuid::new_v4(),
                slot_id: Uuid::new_v4(),
                question_id: Uuid::new_v4(),
                text: "Food waste".to_string(),
                audio_url: None,
                photo_url: Some("/media/abc.jpg".to_string()),
                tags: vec!["demo".to_string()],
                summary_2: vec!["a".to_string(), "b".to_string()],
                created_at: Utc::now(),
            },
            slot_title: "Kickoff".to_string(),
            slot_order_idx: 1,
            question_text: "What problem?".to_string(),
            question_kind: QuestionKindDb::Photo,
        };
        let answer: domain::models::answer::AnswerWithContext = entity.into();
        assert_eq!(answer.answer.text, "Food waste");
        assert_eq!(answer.question_kind, QuestionKind::Photo);
        assert_eq!(answer.answer.summary_2.len(), 2);
    }
}
