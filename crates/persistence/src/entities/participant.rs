//! Participant entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::PushSubscription;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the participants table.
#[derive(Debug, Clone, FromRow)]
pub struct ParticipantEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub nickname: String,
    pub team: String,
    pub push_endpoint: Option<String>,
    pub p256dh: Option<String>,
    pub auth: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ParticipantEntity> for domain::models::Participant {
    fn from(entity: ParticipantEntity) -> Self {
        // A subscription is only usable when all three parts are present.
        let push_subscription = match (entity.push_endpoint, entity.p256dh, entity.auth) {
            (Some(endpoint), Some(p256dh), Some(auth)) if !endpoint.is_empty() => {
                Some(PushSubscription {
                    endpoint,
                    p256dh,
                    auth,
                })
            }
            _ => None,
        };

        Self {
            id: entity.id,
            event_id: entity.event_id,
            nickname: entity.nickname,
            team: entity.team,
            push_subscription,
            created_at: entity.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity() -> ParticipantEntity {
        ParticipantEntity {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            nickname: "Alice".to_string(),
            team: "A".to_string(),
            push_endpoint: Some("https://push.example/1".to_string()),
            p256dh: Some("key".to_string()),
            auth: Some("auth".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_triple_becomes_subscription() {
        let participant: domain::models::Participant = entity().into();
        assert!(participant.has_push_subscription());
    }

    #[test]
    fn test_partial_triple_is_dropped() {
        let mut e = entity();
        e.auth = None;
        let participant: domain::models::Participant = e.into();
        assert!(participant.push_subscription.is_none());
    }
}
