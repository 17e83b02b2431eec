//! Participant domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Browser push subscription credential. Treated as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// Accepts both the flat triple and the shape produced by
/// `PushSubscription.toJSON()` in browsers (`{endpoint, keys: {p256dh, auth}}`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PushSubscriptionInput {
    Flat(PushSubscription),
    Browser {
        endpoint: String,
        keys: SubscriptionKeys,
    },
}

impl From<PushSubscriptionInput> for PushSubscription {
    fn from(input: PushSubscriptionInput) -> Self {
        match input {
            PushSubscriptionInput::Flat(sub) => sub,
            PushSubscriptionInput::Browser { endpoint, keys } => PushSubscription {
                endpoint,
                p256dh: keys.p256dh,
                auth: keys.auth,
            },
        }
    }
}

/// A person registered against an event.
///
/// Nicknames are not unique within an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub event_id: Uuid,
    pub nickname: String,
    pub team: String,
    #[serde(skip_serializing)]
    pub push_subscription: Option<PushSubscription>,
    pub created_at: DateTime<Utc>,
}

impl Participant {
    pub fn has_push_subscription(&self) -> bool {
        self.push_subscription.is_some()
    }
}

/// Data needed to insert a participant.
#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub event_id: Uuid,
    pub nickname: String,
    pub team: String,
    pub push_subscription: Option<PushSubscription>,
}

/// Request to join a published event.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JoinRequest {
    #[serde(alias = "eventCode")]
    #[validate(length(min = 1, message = "event_code is required"))]
    pub event_code: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,

    #[validate(
        length(min = 1, max = 50, message = "nickname must be 1-50 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub nickname: String,

    #[serde(default)]
    #[validate(length(max = 50, message = "team must be at most 50 characters"))]
    pub team: Option<String>,

    #[serde(default)]
    pub push_subscription: Option<PushSubscriptionInput>,
}

/// Response after joining an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    pub participant_id: Uuid,
    pub event_id: Uuid,
    pub nickname: String,
    pub team: String,
    pub push_enabled: bool,
}

impl From<Participant> for JoinResponse {
    fn from(p: Participant) -> Self {
        let push_enabled = p.has_push_subscription();
        Self {
            participant_id: p.id,
            event_id: p.event_id,
            nickname: p.nickname,
            team: p.team,
            push_enabled,
        }
    }
}
