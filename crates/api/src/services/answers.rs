//! Answer ingestion.
//!
//! Each answer in a batch is resolved to text, summarised and stored on its
//! own. A failing or empty item is skipped; the batch only fails when nothing
//! is saved.

use domain::models::answer::{
    resolve_answer_text, AnswerFilter, AnswerListQuery, AnswerPayload, ListAnswersResponse,
    NewAnswer, SavedAnswer, SubmitAnswersRequest, SubmitAnswersResponse, AUDIO_PLACEHOLDER,
};
use domain::models::{Participant, Question, SlotWithQuestions};
use domain::services::generator::{placeholder_summary, AudioClip};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_answers;
use crate::services::access::find_event;

/// Stores a batch of answers for one slot.
pub async fn submit_answers(
    state: &AppState,
    request: SubmitAnswersRequest,
) -> Result<SubmitAnswersResponse, ApiError> {
    request.validate()?;

    let slot = state
        .store
        .find_slot(request.slot_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Slot not found".to_string()))?;
    let participant = state
        .store
        .find_participant(request.participant_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Participant not found".to_string()))?;

    if participant.event_id != slot.slot.event_id {
        return Err(ApiError::Validation(
            "Participant is not registered for this slot's event".to_string(),
        ));
    }

    let total = request.answers.len();
    let mut saved = Vec::with_capacity(total);
    for (question_id, payload) in request.answers {
        if let Some(answer) = save_one(state, &slot, &participant, &question_id, payload).await {
            saved.push(answer);
        }
    }

    let skipped = total - saved.len();
    record_answers(saved.len(), skipped);

    if saved.is_empty() {
        tracing::info!(slot_id = %slot.slot.id, participant_id = %participant.id, skipped, "No answers saved");
        return Err(ApiError::Validation("No answers to save".to_string()));
    }

    tracing::info!(
        slot_id = %slot.slot.id,
        participant_id = %participant.id,
        saved = saved.len(),
        skipped,
        "Answers saved"
    );

    Ok(SubmitAnswersResponse {
        answers_saved: saved.len(),
        skipped,
        answers: saved,
    })
}

fn find_question<'a>(slot: &'a SlotWithQuestions, raw_id: &str) -> Option<&'a Question> {
    let id = Uuid::parse_str(raw_id.trim()).ok()?;
    slot.questions.iter().find(|q| q.id == id)
}

/// Resolves, summarises and stores one answer. `None` means it was skipped.
async fn save_one(
    state: &AppState,
    slot: &SlotWithQuestions,
    participant: &Participant,
    raw_question_id: &str,
    payload: AnswerPayload,
) -> Option<SavedAnswer> {
    let Some(question) = find_question(slot, raw_question_id) else {
        tracing::warn!(
            slot_id = %slot.slot.id,
            question_id = %raw_question_id,
            "Answer for unknown question skipped"
        );
        return None;
    };

    let photo_url = match &payload.photo {
        Some(media) => match state.media.persist(media).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(question_id = %question.id, error = %e, "Photo not stored, answer skipped");
                return None;
            }
        },
        None => None,
    };
    let audio_url = match &payload.audio {
        Some(media) => match state.media.persist(media).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(question_id = %question.id, error = %e, "Audio not stored, answer skipped");
                return None;
            }
        },
        None => None,
    };

    let transcript = match (&audio_url, payload.typed_text()) {
        (Some(url), None) => Some(transcribe(state, url).await),
        _ => None,
    };

    let Some(text) =
        resolve_answer_text(payload.typed_text(), transcript.as_deref(), photo_url.is_some())
    else {
        tracing::debug!(question_id = %question.id, "Empty answer skipped");
        return None;
    };

    let summary = match state.generator.summarize_answer(&text).await {
        Ok(summary) => summary.normalize(&text),
        Err(e) => {
            tracing::warn!(
                question_id = %question.id,
                generator = state.generator.name(),
                error = %e,
                "Summarizer failed, using placeholder summary"
            );
            placeholder_summary(&text)
        }
    };

    let new = NewAnswer {
        participant_id: participant.id,
        slot_id: slot.slot.id,
        question_id: question.id,
        text,
        audio_url,
        photo_url,
        tags: summary.tags,
        summary_2: summary.summary_2,
    };

    match state.store.create_answer(new).await {
        Ok(answer) => Some(answer.into()),
        Err(e) => {
            tracing::warn!(question_id = %question.id, error = %e, "Failed to store answer, continuing");
            None
        }
    }
}

/// Transcript of a stored audio file, or the audio placeholder.
async fn transcribe(state: &AppState, url: &str) -> String {
    let Some(blob) = state.media.load(url).await else {
        tracing::debug!(url = %url, "Audio not in the media directory, not transcribed");
        return AUDIO_PLACEHOLDER.to_string();
    };

    let clip = AudioClip {
        bytes: blob.bytes,
        content_type: blob.content_type,
        file_name: blob.file_name,
    };
    match state.generator.transcribe(&clip).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => AUDIO_PLACEHOLDER.to_string(),
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "Transcription unavailable");
            AUDIO_PLACEHOLDER.to_string()
        }
    }
}

/// Lists answers, optionally narrowed to an event and/or a participant.
pub async fn list_answers(
    state: &AppState,
    query: AnswerListQuery,
) -> Result<ListAnswersResponse, ApiError> {
    let event_id = match query.event_code.as_deref().filter(|c| !c.is_empty()) {
        Some(code) => Some(find_event(state, code).await?.id),
        None => None,
    };

    let data = state
        .store
        .list_answers(AnswerFilter {
            event_id,
            participant_id: query.participant_id,
        })
        .await?;

    Ok(ListAnswersResponse {
        total: data.len(),
        data,
    })
}
