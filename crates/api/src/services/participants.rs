//! Participant registration.

use domain::models::participant::{JoinRequest, JoinResponse, NewParticipant};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::access::{find_event, verify_event_password};

/// Registers a participant against a published event.
///
/// The password is checked before the event status, so a draft event is only
/// revealed to callers who already know its password.
pub async fn join(state: &AppState, request: JoinRequest) -> Result<JoinResponse, ApiError> {
    request.validate()?;
    let event = find_event(state, &request.event_code).await?;
    verify_event_password(state, &event, &request.password).await?;

    if !event.accepts_participants() {
        return Err(ApiError::Validation(
            "Event is not open for registration".to_string(),
        ));
    }

    let participant = state
        .store
        .create_participant(NewParticipant {
            event_id: event.id,
            nickname: request.nickname.trim().to_string(),
            team: request
                .team
                .map(|t| t.trim().to_string())
                .unwrap_or_default(),
            push_subscription: request.push_subscription.map(Into::into),
        })
        .await?;

    tracing::info!(
        event_code = %event.code,
        participant_id = %participant.id,
        push = participant.has_push_subscription(),
        "Participant joined"
    );

    Ok(participant.into())
}
