use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::services::GeneratorError;
use persistence::StoreError;
use serde::Serialize;
use shared::password::PasswordError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Reported as 400 like any other rejected input.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited")]
    RateLimited { retry_after_secs: u64 },

    /// An external collaborator failed and no fallback applies.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl ApiError {
    /// Generic authorization failure that does not say which credential was wrong.
    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized("Invalid event code or password".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, "conflict", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            ApiError::RateLimited { retry_after_secs } => {
                let body = ErrorBody {
                    error: "rate_limited".into(),
                    message: "Too many password attempts. Please try again later.".into(),
                };
                let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
                if let Ok(value) = retry_after_secs.to_string().parse() {
                    response
                        .headers_mut()
                        .insert(axum::http::header::RETRY_AFTER, value);
                }
                return response;
            }
            ApiError::Upstream(msg) => {
                tracing::error!("Upstream error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "upstream_error",
                    msg.clone(),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg.clone(),
            ),
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateCode(code) => {
                ApiError::Conflict(format!("Event code '{}' is already in use", code))
            }
            StoreError::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            StoreError::Corrupt(msg) => ApiError::Internal(format!("Corrupt record: {}", msg)),
            StoreError::Database(e) => ApiError::Internal(format!("Database error: {}", e)),
        }
    }
}

impl From<GeneratorError> for ApiError {
    fn from(err: GeneratorError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Empty => ApiError::Validation("password is required".into()),
            other => ApiError::Internal(format!("Password check failed: {}", other)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = Vec::new();
        collect_messages(&errors, "", &mut messages);

        let message = match messages.len() {
            0 => "Invalid request".to_string(),
            1 => messages.remove(0),
            _ => messages.join(", "),
        };

        ApiError::Validation(message)
    }
}

fn collect_messages(errors: &validator::ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                for e in errs {
                    out.push(
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{}: {}", path, e.code)),
                    );
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect_messages(inner, &format!("{}[{}]", path, idx), out);
                }
            }
        }
    }
}
