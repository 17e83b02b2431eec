//! Event password checks.
//!
//! Publishing, schedule edits and joining are all gated by the event
//! password. Checks are rate limited per event code so the shared password
//! cannot be brute forced through any of those endpoints.

use std::num::NonZeroU32;

use domain::models::Event;
use governor::{clock::Clock, clock::DefaultClock, DefaultKeyedRateLimiter, Quota, RateLimiter};

use crate::app::AppState;
use crate::error::ApiError;

/// Per-event-code limiter for password attempts.
pub struct PasswordRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    attempts_per_minute: u32,
}

impl PasswordRateLimiter {
    /// Returns `None` when `attempts_per_minute` is 0.
    pub fn new(attempts_per_minute: u32) -> Option<Self> {
        let per_minute = NonZeroU32::new(attempts_per_minute)?;
        Some(Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
            attempts_per_minute,
        })
    }

    /// `Err` carries the seconds to wait, at least 1.
    pub fn check(&self, event_code: &str) -> Result<(), u64> {
        match self.limiter.check_key(&event_code.to_string()) {
            Ok(()) => Ok(()),
            Err(not_until) => {
                let wait = not_until.wait_time_from(DefaultClock::default().now());
                Err(wait.as_secs().max(1))
            }
        }
    }

    /// Drops state for codes that have been idle for a full quota period.
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
    }
}

impl std::fmt::Debug for PasswordRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordRateLimiter")
            .field("attempts_per_minute", &self.attempts_per_minute)
            .field("tracked_codes", &self.limiter.len())
            .finish()
    }
}

/// Looks up an event by its exact code.
pub async fn find_event(state: &AppState, code: &str) -> Result<Event, ApiError> {
    state
        .store
        .find_event_by_code(code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))
}

/// Hashes a new event password off the async runtime.
pub async fn hash_password(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || shared::password::hash_event_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(Into::into)
}

/// Verifies `password` against the event's stored hash.
///
/// A mismatch is a generic 401 and never touches any record.
pub async fn verify_event_password(
    state: &AppState,
    event: &Event,
    password: &str,
) -> Result<(), ApiError> {
    if let Some(limiter) = &state.password_limiter {
        limiter.check(&event.code).map_err(|retry_after_secs| {
            tracing::warn!(event_code = %event.code, "Password attempts rate limited");
            ApiError::RateLimited { retry_after_secs }
        })?;
    }

    let password = password.to_string();
    let stored = event.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || {
        shared::password::verify_event_password(&password, &stored)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Password check task failed: {}", e)))??;

    if !matches {
        tracing::info!(event_code = %event.code, "Rejected event password");
        return Err(ApiError::invalid_credentials());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_disables_limiter() {
        assert!(PasswordRateLimiter::new(0).is_none());
    }

    #[test]
    fn test_limiter_is_per_code() {
        let limiter = PasswordRateLimiter::new(2).unwrap();
        assert!(limiter.check("HACK2024").is_ok());
        assert!(limiter.check("HACK2024").is_ok());

        let retry_after = limiter.check("HACK2024").unwrap_err();
        assert!(retry_after >= 1);

        assert!(limiter.check("OTHER").is_ok());
    }

    #[tokio::test]
    async fn test_hash_password_rejects_empty() {
        let err = hash_password(String::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
