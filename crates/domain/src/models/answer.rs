//! Answer domain models.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::slot::QuestionKind;

/// Text stored for an audio answer that could not be transcribed.
pub const AUDIO_PLACEHOLDER: &str = "[audio answer]";

/// Text stored for a photo answer submitted without text.
pub const PHOTO_PLACEHOLDER: &str = "[photo answer]";

/// A persisted answer to one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
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

/// Data needed to insert an answer.
#[derive(Debug, Clone)]
pub struct NewAnswer {
    pub participant_id: Uuid,
    pub slot_id: Uuid,
    pub question_id: Uuid,
    pub text: String,
    pub audio_url: Option<String>,
    pub photo_url: Option<String>,
    pub tags: Vec<String>,
    pub summary_2: Vec<String>,
}

/// An answer joined with the slot and question it responds to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerWithContext {
    #[serde(flatten)]
    pub answer: Answer,
    pub slot_title: String,
    pub slot_order_idx: i32,
    pub question_text: String,
    pub question_kind: QuestionKind,
}

/// Reference to an uploaded media file.
///
/// Either a URL the client already uploaded to, or the bytes inline. Multipart
/// submissions are converted to the inline form at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaRef {
    Url {
        url: String,
    },
    Inline {
        data_base64: String,
        #[serde(default)]
        content_type: Option<String>,
    },
}

/// What a participant submitted for one question.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerPayload {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub kind: Option<QuestionKind>,
    #[serde(default)]
    pub audio: Option<MediaRef>,
    #[serde(default)]
    pub photo: Option<MediaRef>,
}

impl AnswerPayload {
    /// Direct text, if any non-blank text was typed.
    pub fn typed_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// A batch of answers for one slot, keyed by question id.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAnswersRequest {
    pub slot_id: Uuid,
    pub participant_id: Uuid,
    #[serde(default)]
    #[validate(length(min = 1, message = "answers must not be empty"))]
    pub answers: BTreeMap<String, AnswerPayload>,
}

/// One saved answer, as reported back to the participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAnswer {
    pub id: Uuid,
    pub question_id: Uuid,
    pub summary: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Answer> for SavedAnswer {
    fn from(a: Answer) -> Self {
        Self {
            id: a.id,
            question_id: a.question_id,
            summary: a.summary_2,
            tags: a.tags,
            created_at: a.created_at,
        }
    }
}

/// Response after submitting answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswersResponse {
    pub answers_saved: usize,
    pub skipped: usize,
    pub answers: Vec<SavedAnswer>,
}

/// Query parameters for listing answers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerListQuery {
    #[serde(alias = "eventCode")]
    pub event_code: Option<String>,
    #[serde(alias = "participantId")]
    pub participant_id: Option<Uuid>,
}

/// Resolved store-level filter for answers.
#[derive(Debug, Clone, Default)]
pub struct AnswerFilter {
    pub event_id: Option<Uuid>,
    pub participant_id: Option<Uuid>,
}

/// Response for listing answers.
#[derive(Debug, Clone, Serialize)]
pub struct ListAnswersResponse {
    pub data: Vec<AnswerWithContext>,
    pub total: usize,
}

/// Picks the text to store for an answer.
///
/// Typed text wins, then the audio transcript, then the photo placeholder.
/// `None` means the answer has no content and must be skipped.
pub fn resolve_answer_text(
    typed: Option<&str>,
    transcript: Option<&str>,
    has_photo: bool,
) -> Option<String> {
    let non_blank = |s: &&str| !s.trim().is_empty();

    if let Some(text) = typed.filter(non_blank) {
        return Some(text.trim().to_string());
    }
    if let Some(text) = transcript.filter(non_blank) {
        return Some(text.trim().to_string());
    }
    if has_photo {
        return Some(PHOTO_PLACEHOLDER.to_string());
    }
    None
}
