//! Slot and question domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Kind of slot on the event timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SlotType {
    /// Participants answer the slot's questions.
    #[default]
    Ask,
    /// Informational only; questions are ignored.
    Announce,
}

impl std::fmt::Display for SlotType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotType::Ask => write!(f, "ask"),
            SlotType::Announce => write!(f, "announce"),
        }
    }
}

/// Expected answer modality for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    #[default]
    Text,
    Audio,
    Photo,
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionKind::Text => write!(f, "text"),
            QuestionKind::Audio => write!(f, "audio"),
            QuestionKind::Photo => write!(f, "photo"),
        }
    }
}

/// Dispatch state of a slot. Moves one way: pending to dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Pending,
    Dispatched(DateTime<Utc>),
}

/// A scheduled segment of an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: Uuid,
    pub event_id: Uuid,
    pub t_at: DateTime<Utc>,
    pub title: String,
    #[serde(rename = "desc")]
    pub description: String,
    #[serde(rename = "type")]
    pub slot_type: SlotType,
    pub order_idx: i32,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub announce: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Slot {
    pub fn dispatch_state(&self) -> DispatchState {
        match self.dispatched_at {
            Some(at) => DispatchState::Dispatched(at),
            None => DispatchState::Pending,
        }
    }

    pub fn is_ask(&self) -> bool {
        self.slot_type == SlotType::Ask
    }
}

/// A question attached to an ask slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub slot_id: Uuid,
    pub text: String,
    pub kind: QuestionKind,
    pub required: bool,
    pub order_idx: i32,
    pub created_at: DateTime<Utc>,
}

/// A slot together with its questions, as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotWithQuestions {
    #[serde(flatten)]
    pub slot: Slot,
    pub questions: Vec<Question>,
}

/// Data needed to insert a slot.
#[derive(Debug, Clone)]
pub struct NewSlot {
    pub event_id: Uuid,
    pub t_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub slot_type: SlotType,
    pub order_idx: i32,
    pub announce: Option<String>,
}

/// Data needed to insert a question.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub text: String,
    pub kind: QuestionKind,
    pub required: bool,
    pub order_idx: i32,
}

/// A question as authored by an organizer or proposed by the generator.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuestionDraft {
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub text: String,
    #[serde(default)]
    pub kind: QuestionKind,
    #[serde(default)]
    pub required: bool,
}

/// A slot as authored by an organizer or proposed by the generator.
///
/// `t_at` may be omitted; the event start time is used instead.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SlotDraft {
    #[serde(default)]
    pub t_at: Option<DateTime<Utc>>,

    #[validate(length(min = 1, max = 200, message = "slot title must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    pub desc: String,

    #[serde(rename = "type", default)]
    pub slot_type: SlotType,

    #[serde(default)]
    #[validate(nested)]
    pub questions: Vec<QuestionDraft>,

    #[serde(default)]
    pub announce: Option<String>,
}

/// One slot ready for insertion with its questions.
#[derive(Debug, Clone)]
pub struct SlotPlan {
    pub slot: NewSlot,
    pub questions: Vec<NewQuestion>,
}

/// Turns drafts into insertable rows, numbering `order_idx` from 1 in list
/// order for slots and for the questions within each slot. Questions on
/// announce slots are discarded.
pub fn plan_schedule(
    event_id: Uuid,
    drafts: Vec<SlotDraft>,
    default_t_at: DateTime<Utc>,
) -> Vec<SlotPlan> {
    drafts
        .into_iter()
        .enumerate()
        .map(|(idx, draft)| {
            let questions = if draft.slot_type == SlotType::Ask {
                draft
                    .questions
                    .into_iter()
                    .enumerate()
                    .map(|(q_idx, q)| NewQuestion {
                        text: q.text,
                        kind: q.kind,
                        required: q.required,
                        order_idx: q_idx as i32 + 1,
                    })
                    .collect()
            } else {
                Vec::new()
            };

            SlotPlan {
                slot: NewSlot {
                    event_id,
                    t_at: draft.t_at.unwrap_or(default_t_at),
                    title: draft.title,
                    description: draft.desc,
                    slot_type: draft.slot_type,
                    order_idx: idx as i32 + 1,
                    announce: draft.announce.filter(|a| !a.trim().is_empty()),
                },
                questions,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft(title: &str, slot_type: SlotType, questions: usize) -> SlotDraft {
        SlotDraft {
            t_at: None,
            title: title.to_string(),
            desc: String::new(),
            slot_type,
            questions: (0..questions)
                .map(|i| QuestionDraft {
                    text: format!("Question {}", i + 1),
                    kind: QuestionKind::Text,
                    required: false,
                })
                .collect(),
            announce: None,
        }
    }

    #[test]
    fn test_slot_draft_defaults() {
        let json = r#"{"title":"Kickoff","questions":[{"text":"What problem?"}]}"#;
        let draft: SlotDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.slot_type, SlotType::Ask);
        assert!(draft.t_at.is_none());
        assert_eq!(draft.questions[0].kind, QuestionKind::Text);
        assert!(!draft.questions[0].required);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_slot_draft_rejects_blank_question() {
        let json = r#"{"title":"Kickoff","type":"ask","questions":[{"text":"  "}]}"#;
        let draft: SlotDraft = serde_json::from_str(json).unwrap();
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_plan_schedule_numbers_from_one() {
        let start = Utc.with_ymd_and_hms(2024, 12, 15, 0, 0, 0).unwrap();
        let plans = plan_schedule(
            Uuid::nil(),
            vec![
                draft("Kickoff", SlotType::Ask, 1),
                draft("Lunch", SlotType::Announce, 0),
                draft("Pitch", SlotType::Ask, 2),
            ],
            start,
        );
        let idx: Vec<i32> = plans.iter().map(|p| p.slot.order_idx).collect();
        assert_eq!(idx, vec![1, 2, 3]);
        assert!(plans.iter().all(|p| p.slot.t_at == start));
        assert_eq!(plans[2].questions.len(), 2);
    }

    #[test]
    fn test_plan_schedule_numbers_questions_per_slot() {
        let start = Utc::now();
        let plans = plan_schedule(
            Uuid::nil(),
            vec![draft("Kickoff", SlotType::Ask, 3), draft("Pitch", SlotType::Ask, 2)],
            start,
        );
        let first: Vec<(i32, &str)> = plans[0]
            .questions
            .iter()
            .map(|q| (q.order_idx, q.text.as_str()))
            .collect();
        assert_eq!(first, vec![(1, "Question 1"), (2, "Question 2"), (3, "Question 3")]);
        let second: Vec<i32> = plans[1].questions.iter().map(|q| q.order_idx).collect();
        assert_eq!(second, vec![1, 2]);
    }

    #[test]
    fn test_plan_schedule_drops_questions_on_announce() {
        let start = Utc::now();
        let plans = plan_schedule(Uuid::nil(), vec![draft("Lunch", SlotType::Announce, 2)], start);
        assert!(plans[0].questions.is_empty());
    }

    #[test]
    fn test_slot_serializes_wire_names() {
        let now = Utc::now();
        let slot = SlotWithQuestions {
            slot: Slot {
                id: Uuid::nil(),
                event_id: Uuid::nil(),
                t_at: now,
                title: "Kickoff".to_string(),
                description: "Opening".to_string(),
                slot_type: SlotType::Ask,
                order_idx: 1,
                dispatched_at: None,
                announce: None,
                created_at: now,
            },
            questions: vec![],
        };
        let value = serde_json::to_value(&slot).unwrap();
        assert_eq!(value["desc"], "Opening");
        assert_eq!(value["type"], "ask");
        assert_eq!(value["questions"], serde_json::json!([]));
        assert_eq!(slot.slot.dispatch_state(), DispatchState::Pending);
    }
}
