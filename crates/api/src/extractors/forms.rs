//! Event and answer submissions, accepted as JSON or multipart.
//!
//! Multipart parts are mapped onto the same typed requests as the JSON bodies,
//! so handlers never see the wire format.

use std::collections::BTreeMap;

use axum::{
    async_trait,
    extract::{multipart::Field, FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use domain::models::answer::{AnswerPayload, MediaRef, SubmitAnswersRequest};
use domain::models::event::CreateEventRequest;
use domain::models::slot::QuestionKind;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::json::ApiJson;
use crate::app::AppState;
use crate::error::ApiError;
use crate::services::documents::Document;

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false)
}

fn multipart_error(err: impl std::fmt::Display) -> ApiError {
    ApiError::Validation(format!("Invalid multipart body: {}", err))
}

async fn field_text(field: Field<'_>) -> Result<String, ApiError> {
    field.text().await.map_err(multipart_error)
}

/// Event creation request plus an optional uploaded brochure.
#[derive(Debug)]
pub struct EventForm {
    pub request: CreateEventRequest,
    pub document: Option<Document>,
}

const EVENT_TEXT_FIELDS: &[&str] = &[
    "name",
    "code",
    "password",
    "venue",
    "start_at",
    "end_at",
    "document_url",
    "pasted_text",
];

#[async_trait]
impl FromRequest<AppState> for EventForm {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let ApiJson(request) = ApiJson::<CreateEventRequest>::from_request(req, state).await?;
            return Ok(EventForm {
                request,
                document: None,
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(multipart_error)?;
        let mut fields = Map::new();
        let mut document = None;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "document" | "file" => {
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    if !bytes.is_empty() {
                        document = Some(Document {
                            bytes: bytes.to_vec(),
                            content_type,
                            file_name,
                        });
                    }
                }
                "slots" => {
                    let text = field_text(field).await?;
                    if !text.trim().is_empty() {
                        let slots: Value = serde_json::from_str(&text).map_err(|e| {
                            ApiError::Validation(format!("slots must be a JSON array: {}", e))
                        })?;
                        fields.insert(name, slots);
                    }
                }
                "utc_offset_minutes" => {
                    let text = field_text(field).await?;
                    let minutes: i32 = text.trim().parse().map_err(|_| {
                        ApiError::Validation("utc_offset_minutes must be an integer".to_string())
                    })?;
                    fields.insert(name, Value::from(minutes));
                }
                known if EVENT_TEXT_FIELDS.contains(&known) => {
                    let text = field_text(field).await?;
                    if !text.trim().is_empty() {
                        fields.insert(name, Value::String(text));
                    }
                }
                other => tracing::debug!(field = %other, "Ignoring unknown event form field"),
            }
        }

        let request = serde_json::from_value(Value::Object(fields))
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        Ok(EventForm { request, document })
    }
}

/// Part of an answer addressed by a multipart field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnswerPart {
    Text,
    Kind,
    Audio,
    Photo,
}

/// Splits `answers[<question id>][<part>]` into the question id and part.
fn parse_answer_field(name: &str) -> Option<(&str, AnswerPart)> {
    let rest = name.strip_prefix("answers[")?;
    let (question_id, part) = rest.split_once("][")?;
    let part = match part.strip_suffix(']')? {
        "text" => AnswerPart::Text,
        "kind" => AnswerPart::Kind,
        "audio" => AnswerPart::Audio,
        "photo" => AnswerPart::Photo,
        _ => return None,
    };
    if question_id.is_empty() {
        return None;
    }
    Some((question_id, part))
}

fn parse_uuid(field: &str, value: Option<String>) -> Result<Uuid, ApiError> {
    let value = value.ok_or_else(|| ApiError::Validation(format!("{} is required", field)))?;
    Uuid::parse_str(value.trim())
        .map_err(|_| ApiError::Validation(format!("{} must be a UUID", field)))
}

/// Answer batch. Uploaded files ride along as inline media and are only
/// written to the media directory once the answer they belong to is accepted.
#[derive(Debug)]
pub struct AnswerForm(pub SubmitAnswersRequest);

#[async_trait]
impl FromRequest<AppState> for AnswerForm {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let ApiJson(request) =
                ApiJson::<SubmitAnswersRequest>::from_request(req, state).await?;
            return Ok(AnswerForm(request));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(multipart_error)?;
        let mut slot_id = None;
        let mut participant_id = None;
        let mut answers: BTreeMap<String, AnswerPayload> = BTreeMap::new();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "slot_id" | "slotId" => slot_id = Some(field_text(field).await?),
                "participant_id" | "participantId" => {
                    participant_id = Some(field_text(field).await?)
                }
                "answers" => {
                    let text = field_text(field).await?;
                    let batch: BTreeMap<String, AnswerPayload> = serde_json::from_str(&text)
                        .map_err(|e| ApiError::Validation(format!("Invalid answers: {}", e)))?;
                    answers.extend(batch);
                }
                _ => {
                    let Some((question_id, part)) = parse_answer_field(&name) else {
                        tracing::debug!(field = %name, "Ignoring unknown answer form field");
                        continue;
                    };
                    let question_id = question_id.to_string();
                    let media = match part {
                        AnswerPart::Audio | AnswerPart::Photo => read_media(field).await?,
                        AnswerPart::Text | AnswerPart::Kind => {
                            let text = field_text(field).await?;
                            let payload = answers.entry(question_id).or_default();
                            if part == AnswerPart::Text {
                                payload.text = Some(text);
                            } else {
                                payload.kind =
                                    serde_json::from_value::<QuestionKind>(Value::String(text))
                                        .ok();
                            }
                            continue;
                        }
                    };
                    if let Some(media) = media {
                        let payload = answers.entry(question_id).or_default();
                        match part {
                            AnswerPart::Audio => payload.audio = Some(media),
                            _ => payload.photo = Some(media),
                        }
                    }
                }
            }
        }

        Ok(AnswerForm(SubmitAnswersRequest {
            slot_id: parse_uuid("slot_id", slot_id)?,
            participant_id: parse_uuid("participant_id", participant_id)?,
            answers,
        }))
    }
}

/// Reads an uploaded file as inline media, or a plain part as a media URL.
async fn read_media(field: Field<'_>) -> Result<Option<MediaRef>, ApiError> {
    if field.file_name().is_none() {
        let url = field_text(field).await?;
        let url = url.trim();
        return Ok((!url.is_empty()).then(|| MediaRef::Url {
            url: url.to_string(),
        }));
    }

    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await.map_err(multipart_error)?;
    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(MediaRef::Inline {
        data_base64: STANDARD.encode(&bytes),
        content_type,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer_field() {
        let id = "9b2f7c1e-0000-0000-0000-000000000001";
        assert_eq!(
            parse_answer_field(&format!("answers[{}][text]", id)),
            Some((id, AnswerPart::Text))
        );
        assert_eq!(
            parse_answer_field(&format!("answers[{}][photo]", id)),
            Some((id, AnswerPart::Photo))
        );
        assert_eq!(parse_answer_field("answers[q1][audio]"), Some(("q1", AnswerPart::Audio)));
    }

    #[test]
    fn test_parse_answer_field_rejects_other_shapes() {
        assert_eq!(parse_answer_field("answers[q1][video]"), None);
        assert_eq!(parse_answer_field("answers[][text]"), None);
        assert_eq!(parse_answer_field("answers[q1]"), None);
        assert_eq!(parse_answer_field("slot_id"), None);
        assert_eq!(parse_answer_field("answers[q1][text"), None);
    }

    #[test]
    fn test_parse_uuid() {
        assert!(parse_uuid("slot_id", None).is_err());
        assert!(parse_uuid("slot_id", Some("nope".into())).is_err());
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid("slot_id", Some(id.to_string())).unwrap(), id);
    }
}
