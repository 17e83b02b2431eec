//! Event domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::slot::{SlotDraft, SlotWithQuestions};

/// Lifecycle status of an event.
///
/// Transitions only move forward: `draft -> published`. Nothing in the
/// service unpublishes an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Published,
    Archived,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Draft => write!(f, "draft"),
            EventStatus::Published => write!(f, "published"),
            EventStatus::Archived => write!(f, "archived"),
        }
    }
}

/// A time-boxed event (hackathon, workshop).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Event {
    pub id: Uuid,
    pub code: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: String,
    pub venue: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: EventStatus,
    pub document_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Participants may only join once the organizer has published.
    pub fn accepts_participants(&self) -> bool {
        self.status == EventStatus::Published
    }
}

/// Data needed to insert an event. Status is always `draft` on insert.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub code: String,
    pub password_hash: String,
    pub name: String,
    pub venue: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub document_url: Option<String>,
}

/// Where the initial schedule of a new event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleSource {
    Document,
    PastedText,
    Manual,
}

/// Request to create an event (JSON form).
///
/// At least one of `document_url`, `pasted_text` or `slots` must be supplied.
/// The multipart form carries the same fields plus an uploaded document.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
#[validate(schema(function = "validate_create_event"))]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,

    #[validate(custom(function = "shared::validation::validate_event_code"))]
    pub code: String,

    #[validate(length(min = 1, max = 128, message = "password must be 1-128 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 200, message = "venue must be 1-200 characters"))]
    pub venue: String,

    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,

    /// URL of the event brochure to extract text from.
    #[validate(url(message = "document_url must be a valid URL"))]
    pub document_url: Option<String>,

    /// Brochure text pasted by the organizer.
    pub pasted_text: Option<String>,

    /// Manually authored schedule, used verbatim when no text source resolves.
    #[validate(nested)]
    pub slots: Option<Vec<SlotDraft>>,

    /// Offset applied to naive slot times proposed by the generator.
    #[serde(default)]
    #[validate(range(min = -720, max = 840, message = "utc_offset_minutes out of range"))]
    pub utc_offset_minutes: i32,
}

impl CreateEventRequest {
    pub fn has_pasted_text(&self) -> bool {
        self.pasted_text
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false)
    }

    pub fn has_manual_slots(&self) -> bool {
        self.slots.as_ref().map(|s| !s.is_empty()).unwrap_or(false)
    }
}

fn validate_create_event(req: &CreateEventRequest) -> Result<(), ValidationError> {
    shared::validation::validate_time_range(req.start_at, req.end_at)
}

/// Response after creating an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateEventResponse {
    pub event_id: Uuid,
    pub code: String,
    pub status: EventStatus,
    pub source: ScheduleSource,
    pub slots_created: usize,
}

/// An event with its full schedule.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EventWithSlots {
    pub event: Event,
    pub slots: Vec<SlotWithQuestions>,
}

/// Request body for password-gated organizer operations.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PasswordRequest {
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Response after publishing an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PublishEventResponse {
    pub code: String,
    pub status: EventStatus,
    pub published_at: Option<DateTime<Utc>>,
}

/// Request to replace an event's whole schedule.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ReplaceScheduleRequest {
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,

    #[validate(nested)]
    pub slots: Vec<SlotDraft>,
}

/// Response after replacing a schedule.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ReplaceScheduleResponse {
    pub slots_updated: usize,
    pub slots: Vec<SlotWithQuestions>,
}

/// Response for listing events.
#[derive(Debug, Clone, Serialize)]
pub struct ListEventsResponse {
    pub data: Vec<Event>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn request() -> CreateEventRequest {
        let start = Utc.with_ymd_and_hms(2024, 12, 15, 0, 0, 0).unwrap();
        CreateEventRequest {
            name: "Seoul Hackathon".to_string(),
            code: "HACK2024".to_string(),
            password: "pw1".to_string(),
            venue: "Seoul".to_string(),
            start_at: start,
            end_at: start + Duration::hours(10),
            document_url: None,
            pasted_text: None,
            slots: None,
            utc_offset_minutes: 540,
        }
    }

    #[test]
    fn test_event_status_display() {
        assert_eq!(EventStatus::Draft.to_string(), "draft");
        assert_eq!(EventStatus::Published.to_string(), "published");
        assert_eq!(EventStatus::Archived.to_string(), "archived");
    }

    #[test]
    fn test_event_status_serde() {
        assert_eq!(
            serde_json::to_string(&EventStatus::Published).unwrap(),
            "\"published\""
        );
        let status: EventStatus = serde_json::from_str("\"draft\"").unwrap();
        assert_eq!(status, EventStatus::Draft);
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let now = Utc::now();
        let event = Event {
            id: Uuid::nil(),
            code: "HACK2024".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            name: "Hack".to_string(),
            venue: "Seoul".to_string(),
            start_at: now,
            end_at: now,
            status: EventStatus::Draft,
            document_url: None,
            published_at: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2id"));
        assert!(!event.accepts_participants());
    }

    #[test]
    fn test_create_event_request_valid() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_create_event_request_rejects_inverted_times() {
        let mut req = request();
        req.end_at = req.start_at - Duration::hours(1);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_event_request_rejects_bad_code() {
        let mut req = request();
        req.code = "a b".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_source_helpers() {
        let mut req = request();
        assert!(!req.has_pasted_text());
        assert!(!req.has_manual_slots());
        req.pasted_text = Some("   ".to_string());
        assert!(!req.has_pasted_text());
        req.pasted_text = Some("09:00 Kickoff".to_string());
        assert!(req.has_pasted_text());
        req.slots = Some(vec![]);
        assert!(!req.has_manual_slots());
    }
}
