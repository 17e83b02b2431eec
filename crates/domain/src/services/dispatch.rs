//! Slot dispatch rules.
//!
//! A slot is due when it is an ask slot, has not been dispatched yet and its
//! scheduled time falls inside `[now, now + window]`.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::slot::DispatchState;
use crate::models::Slot;

use super::push::PushMessage;

/// Default look-ahead for the dispatch scan.
pub const DEFAULT_WINDOW_SECS: i64 = 120;

/// Time window scanned by one dispatch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchWindow {
    pub from: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl DispatchWindow {
    pub fn starting_at(now: DateTime<Utc>, window_secs: i64) -> Self {
        Self {
            from: now,
            until: now + Duration::seconds(window_secs),
        }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.from && t <= self.until
    }

    /// Whether `slot` should be dispatched in this window.
    pub fn is_due(&self, slot: &Slot) -> bool {
        slot.is_ask()
            && slot.dispatch_state() == DispatchState::Pending
            && self.contains(slot.t_at)
    }
}

/// Deep link to the participant dashboard for a slot.
pub fn dashboard_url(base_url: &str, slot_id: Uuid) -> String {
    format!("{}/dashboard?slot={}", base_url.trim_end_matches('/'), slot_id)
}

/// Push message announcing that a slot is open.
pub fn slot_message(event_name: &str, slot: &Slot, base_url: &str) -> PushMessage {
    PushMessage {
        title: format!("{} - {}", event_name, slot.title),
        body: slot.description.clone(),
        url: dashboard_url(base_url, slot.id),
    }
}

/// Result of one dispatch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchSummary {
    pub current_time: DateTime<Utc>,
    /// Due slots found by the scan.
    pub slots_found: usize,
    /// Slots this run claimed and pushed.
    pub slots_processed: usize,
    /// Successful deliveries across all slots.
    pub notifications_sent: usize,
    pub notifications_failed: usize,
}

impl DispatchSummary {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            current_time: now,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SlotType;

    fn slot_at(t_at: DateTime<Utc>, slot_type: SlotType) -> Slot {
        Slot {
            id: Uuid::nil(),
            event_id: Uuid::nil(),
            t_at,
            title: "Kickoff".to_string(),
            description: "Say hi".to_string(),
            slot_type,
            order_idx: 1,
            dispatched_at: None,
            announce: None,
            created_at: t_at,
        }
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let now = Utc::now();
        let window = DispatchWindow::starting_at(now, DEFAULT_WINDOW_SECS);
        assert!(window.contains(now));
        assert!(window.contains(now + Duration::seconds(120)));
        assert!(!window.contains(now + Duration::seconds(121)));
        assert!(!window.contains(now - Duration::seconds(1)));
    }

    #[test]
    fn test_only_pending_ask_slots_are_due() {
        let now = Utc::now();
        let window = DispatchWindow::starting_at(now, DEFAULT_WINDOW_SECS);
        let t = now + Duration::seconds(60);

        assert!(window.is_due(&slot_at(t, SlotType::Ask)));
        assert!(!window.is_due(&slot_at(t, SlotType::Announce)));

        let mut dispatched = slot_at(t, SlotType::Ask);
        dispatched.dispatched_at = Some(now);
        assert_eq!(dispatched.dispatch_state(), DispatchState::Dispatched(now));
        assert!(!window.is_due(&dispatched));
    }

    #[test]
    fn test_slot_message() {
        let slot = slot_at(Utc::now(), SlotType::Ask);
        let msg = slot_message("Seoul Hackathon", &slot, "https://xl.example/");
        assert_eq!(msg.title, "Seoul Hackathon - Kickoff");
        assert_eq!(msg.body, "Say hi");
        assert_eq!(
            msg.url,
            format!("https://xl.example/dashboard?slot={}", Uuid::nil())
        );
    }
}
