//! Common validation utilities.

use chrono::{DateTime, Utc};
use validator::ValidationError;

/// Longest event code accepted.
pub const MAX_EVENT_CODE_LENGTH: usize = 32;

lazy_static::lazy_static! {
    static ref EVENT_CODE_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]{2,31}$").unwrap();
}

/// Validates an event code: 3-32 chars, letters, digits, `-` and `_`, not
/// starting with a separator. Codes are matched case-sensitively, so no case
/// folding happens here.
pub fn validate_event_code(code: &str) -> Result<(), ValidationError> {
    if EVENT_CODE_REGEX.is_match(code) {
        Ok(())
    } else {
        let mut err = ValidationError::new("event_code_format");
        err.message = Some(
            "Event code must be 3-32 letters, digits, '-' or '_' and start with a letter or digit"
                .into(),
        );
        Err(err)
    }
}

/// Validates that a string is not only whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates that an event ends after it starts.
pub fn validate_time_range(
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if end_at > start_at {
        Ok(())
    } else {
        let mut err = ValidationError::new("time_range");
        err.message = Some("end_at must be after start_at".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_event_code_accepts_typical_codes() {
        assert!(validate_event_code("HACK2024").is_ok());
        assert!(validate_event_code("hackathon2024").is_ok());
        assert!(validate_event_code("seoul-ai_camp").is_ok());
        assert!(validate_event_code("abc").is_ok());
    }

    #[test]
    fn test_event_code_rejects_bad_codes() {
        assert!(validate_event_code("").is_err());
        assert!(validate_event_code("ab").is_err());
        assert!(validate_event_code("-lead").is_err());
        assert!(validate_event_code("has space").is_err());
        assert!(validate_event_code("슬롯").is_err());
        assert!(validate_event_code(&"a".repeat(MAX_EVENT_CODE_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_event_code_max_length_is_accepted() {
        assert!(validate_event_code(&"a".repeat(MAX_EVENT_CODE_LENGTH)).is_ok());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Alice").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }

    #[test]
    fn test_time_range() {
        let start = Utc.with_ymd_and_hms(2024, 12, 15, 9, 0, 0).unwrap();
        assert!(validate_time_range(start, start + Duration::hours(8)).is_ok());
        assert!(validate_time_range(start, start).is_err());
        assert!(validate_time_range(start, start - Duration::minutes(1)).is_err());
    }

    #[test]
    fn test_error_carries_message() {
        let err = validate_event_code("x").unwrap_err();
        assert!(err.message.unwrap().contains("3-32"));
    }
}
