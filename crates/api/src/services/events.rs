//! Event lifecycle: creation, publishing and schedule edits.

use chrono::{FixedOffset, Offset, Utc};
use domain::models::event::{
    CreateEventRequest, CreateEventResponse, EventWithSlots, ListEventsResponse, NewEvent,
    PasswordRequest, PublishEventResponse, ReplaceScheduleRequest, ReplaceScheduleResponse,
    ScheduleSource,
};
use domain::models::slot::{plan_schedule, SlotDraft};
use domain::models::{EventStatus, SlotWithQuestions};
use domain::services::generator::truncate_chars;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_event_created;
use crate::services::access::{find_event, hash_password, verify_event_password};
use crate::services::documents::{extract_text_blocking, fetch_document, Document};

/// Schedule resolved for a new event, and where it came from.
struct ResolvedSchedule {
    source: ScheduleSource,
    drafts: Vec<SlotDraft>,
}

fn source_label(source: ScheduleSource) -> &'static str {
    match source {
        ScheduleSource::Document => "document",
        ScheduleSource::PastedText => "pasted_text",
        ScheduleSource::Manual => "manual",
    }
}

/// Creates a draft event and its schedule.
///
/// The schedule comes from the first source that resolves: document text,
/// then pasted text (both through the generator), then the manual slots.
pub async fn create_event(
    state: &AppState,
    request: CreateEventRequest,
    document: Option<Document>,
) -> Result<CreateEventResponse, ApiError> {
    request.validate()?;

    let has_document_url = request
        .document_url
        .as_deref()
        .map(|u| !u.trim().is_empty())
        .unwrap_or(false);
    if document.is_none()
        && !has_document_url
        && !request.has_pasted_text()
        && !request.has_manual_slots()
    {
        return Err(ApiError::Validation(
            "Provide a document, pasted text or manual slots".to_string(),
        ));
    }

    if state.store.find_event_by_code(&request.code).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "Event code '{}' is already in use",
            request.code
        )));
    }

    let resolved = resolve_schedule(state, &request, document).await?;
    let password_hash = hash_password(request.password.clone()).await?;

    let event = state
        .store
        .create_event(NewEvent {
            code: request.code,
            password_hash,
            name: request.name.trim().to_string(),
            venue: request.venue.trim().to_string(),
            start_at: request.start_at,
            end_at: request.end_at,
            document_url: request.document_url.filter(|u| !u.trim().is_empty()),
        })
        .await?;

    let plans = plan_schedule(event.id, resolved.drafts, event.start_at);
    let planned = plans.len();
    let mut slots_created = 0;
    for plan in plans {
        let title = plan.slot.title.clone();
        match state.store.create_slot(plan).await {
            Ok(_) => slots_created += 1,
            Err(e) => {
                tracing::warn!(
                    event_code = %event.code,
                    slot_title = %title,
                    error = %e,
                    "Failed to create slot, continuing"
                );
            }
        }
    }

    record_event_created(source_label(resolved.source));
    tracing::info!(
        event_id = %event.id,
        event_code = %event.code,
        source = source_label(resolved.source),
        slots_planned = planned,
        slots_created,
        "Event created"
    );

    Ok(CreateEventResponse {
        event_id: event.id,
        code: event.code,
        status: event.status,
        source: resolved.source,
        slots_created,
    })
}

async fn resolve_schedule(
    state: &AppState,
    request: &CreateEventRequest,
    document: Option<Document>,
) -> Result<ResolvedSchedule, ApiError> {
    let document_supplied = document.is_some() || request.document_url.is_some();

    let mut text_source = None;
    if let Some(text) = document_text(state, request, document).await {
        text_source = Some((ScheduleSource::Document, text));
    } else if request.has_pasted_text() {
        let pasted = request.pasted_text.clone().unwrap_or_default();
        text_source = Some((ScheduleSource::PastedText, pasted));
    }

    let manual = || ResolvedSchedule {
        source: ScheduleSource::Manual,
        drafts: request.slots.clone().unwrap_or_default(),
    };

    let Some((source, text)) = text_source else {
        if request.has_manual_slots() {
            return Ok(manual());
        }
        if document_supplied {
            return Err(ApiError::Validation(
                "Could not extract text from the document. Paste the text or add slots manually"
                    .to_string(),
            ));
        }
        return Err(ApiError::Validation(
            "Provide a document, pasted text or manual slots".to_string(),
        ));
    };

    let text = truncate_chars(text.trim(), state.config.openai.max_input_chars);
    match state.generator.propose_slots(text).await {
        Ok(schedule) => {
            let offset = FixedOffset::east_opt(request.utc_offset_minutes * 60)
                .unwrap_or_else(|| Utc.fix());
            let drafts = schedule.into_drafts(request.start_at, offset);
            if drafts.is_empty() && request.has_manual_slots() {
                tracing::warn!(event_code = %request.code, "Generator proposed no slots, using manual slots");
                return Ok(manual());
            }
            Ok(ResolvedSchedule { source, drafts })
        }
        Err(e) if request.has_manual_slots() => {
            tracing::warn!(
                event_code = %request.code,
                generator = state.generator.name(),
                error = %e,
                "Slot proposal failed, using manual slots"
            );
            Ok(manual())
        }
        Err(e) => Err(e.into()),
    }
}

/// Text of the uploaded or linked document, if it can be read.
async fn document_text(
    state: &AppState,
    request: &CreateEventRequest,
    document: Option<Document>,
) -> Option<String> {
    let document = match document {
        Some(doc) => doc,
        None => {
            let url = request.document_url.as_deref().filter(|u| !u.trim().is_empty())?;
            match fetch_document(&state.http, url, state.config.server.max_body_size).await {
                Ok(doc) => doc,
                Err(e) => {
                    tracing::warn!(event_code = %request.code, url = %url, error = %e, "Document fetch failed");
                    return None;
                }
            }
        }
    };

    match extract_text_blocking(document).await {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!(event_code = %request.code, error = %e, "Document text extraction failed");
            None
        }
    }
}

/// Publishes an event. Publishing twice returns the same state.
pub async fn publish_event(
    state: &AppState,
    code: &str,
    request: PasswordRequest,
) -> Result<PublishEventResponse, ApiError> {
    request.validate()?;
    let event = find_event(state, code).await?;
    verify_event_password(state, &event, &request.password).await?;

    let event = if event.status == EventStatus::Published {
        tracing::debug!(event_code = %event.code, "Event already published");
        event
    } else {
        let published = state.store.publish_event(event.id, Utc::now()).await?;
        tracing::info!(event_code = %published.code, "Event published");
        published
    };

    Ok(PublishEventResponse {
        code: event.code,
        status: event.status,
        published_at: event.published_at,
    })
}

/// Replaces the whole schedule of an event. Old slots and their questions are
/// discarded; new slots are numbered from 1.
pub async fn replace_schedule(
    state: &AppState,
    code: &str,
    request: ReplaceScheduleRequest,
) -> Result<ReplaceScheduleResponse, ApiError> {
    request.validate()?;
    let event = find_event(state, code).await?;
    verify_event_password(state, &event, &request.password).await?;

    let plans = plan_schedule(event.id, request.slots, event.start_at);
    let slots = state.store.replace_schedule(event.id, plans).await?;

    tracing::info!(event_code = %event.code, slots = slots.len(), "Schedule replaced");

    Ok(ReplaceScheduleResponse {
        slots_updated: slots.len(),
        slots,
    })
}

pub async fn get_event(state: &AppState, code: &str) -> Result<EventWithSlots, ApiError> {
    let event = find_event(state, code).await?;
    let slots = state.store.list_slots(event.id).await?;
    Ok(EventWithSlots { event, slots })
}

pub async fn list_events(state: &AppState) -> Result<ListEventsResponse, ApiError> {
    Ok(ListEventsResponse {
        data: state.store.list_events().await?,
    })
}

pub async fn get_slot(state: &AppState, slot_id: Uuid) -> Result<SlotWithQuestions, ApiError> {
    state
        .store
        .find_slot(slot_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Slot not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_labels() {
        assert_eq!(source_label(ScheduleSource::Document), "document");
        assert_eq!(source_label(ScheduleSource::PastedText), "pasted_text");
        assert_eq!(source_label(ScheduleSource::Manual), "manual");
    }
}
