//! Slot dispatch.
//!
//! Invoked by an external cron trigger. Each due slot is claimed in the store
//! before anything is sent, so overlapping runs push a slot at most once.

use chrono::{DateTime, Utc};
use domain::models::notification::NewNotification;
use domain::models::{NotificationType, Participant, PushSubscription};
use domain::services::{slot_message, DispatchSummary, DispatchWindow};
use persistence::DueSlot;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_slot_dispatched;

/// Push subscriptions of the participants that have one.
pub fn subscriptions_of(participants: Vec<Participant>) -> Vec<PushSubscription> {
    participants
        .into_iter()
        .filter_map(|p| p.push_subscription)
        .collect()
}

/// Pushes every ask slot due in `[now, now + window]` that has not been
/// dispatched yet.
pub async fn run_dispatch(state: &AppState, now: DateTime<Utc>) -> Result<DispatchSummary, ApiError> {
    let window = DispatchWindow::starting_at(now, state.config.dispatch.window_secs);
    let due = state.store.find_due_slots(window).await?;

    let mut summary = DispatchSummary::new(now);
    summary.slots_found = due.len();

    for due_slot in due {
        if !state.store.claim_slot_dispatch(due_slot.slot.id, now).await? {
            tracing::debug!(slot_id = %due_slot.slot.id, "Slot already claimed by another run");
            continue;
        }

        match dispatch_slot(state, &due_slot).await {
            Ok((sent, failed)) => {
                summary.notifications_sent += sent;
                summary.notifications_failed += failed;
            }
            Err(e) => {
                tracing::warn!(
                    event_code = %due_slot.event_code,
                    slot_id = %due_slot.slot.id,
                    error = %e,
                    "Slot dispatch failed after claim, continuing"
                );
            }
        }
        summary.slots_processed += 1;
        record_slot_dispatched();
    }

    tracing::info!(
        slots_found = summary.slots_found,
        slots_processed = summary.slots_processed,
        sent = summary.notifications_sent,
        failed = summary.notifications_failed,
        "Dispatch run finished"
    );

    Ok(summary)
}

async fn dispatch_slot(state: &AppState, due: &DueSlot) -> Result<(usize, usize), ApiError> {
    let participants = state.store.list_participants(due.slot.event_id).await?;
    let subscriptions = subscriptions_of(participants);
    let message = slot_message(
        &due.event_name,
        &due.slot,
        &state.config.server.public_base_url,
    );

    let report = state.push.send_bulk(&subscriptions, &message).await;
    tracing::info!(
        event_code = %due.event_code,
        slot_id = %due.slot.id,
        recipients = report.total,
        successful = report.successful,
        failed = report.failed,
        "Slot dispatched"
    );

    if let Err(e) = state
        .store
        .create_notification(NewNotification {
            event_id: due.slot.event_id,
            slot_id: Some(due.slot.id),
            notification_type: NotificationType::SlotStart,
            title: message.title,
            message: message.body,
            delivered: report.successful as i32,
            failed: report.failed as i32,
        })
        .await
    {
        tracing::warn!(slot_id = %due.slot.id, error = %e, "Failed to record notification");
    }

    Ok((report.successful, report.failed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn participant(sub: Option<&str>) -> Participant {
        Participant {
            id: Uuid::new_v4(),
            event_id: Uuid::nil(),
            nickname: "Alice".to_string(),
            team: String::new(),
            push_subscription: sub.map(|endpoint| PushSubscription {
                endpoint: endpoint.to_string(),
                p256dh: "key".to_string(),
                auth: "auth".to_string(),
            }),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_participants_without_subscription_are_skipped() {
        let subs = subscriptions_of(vec![
            participant(Some("https://push.example/a")),
            participant(None),
            participant(Some("https://push.example/b")),
        ]);
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[1].endpoint, "https://push.example/b");
    }
}
