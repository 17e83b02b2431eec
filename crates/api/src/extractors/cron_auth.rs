//! Cron trigger authentication.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use shared::crypto::secrets_match;

use crate::app::AppState;
use crate::error::ApiError;

/// Guards the cron trigger and the manual notification send.
///
/// When `dispatch.cron_secret` is set the request must carry
/// `Authorization: Bearer <secret>`; otherwise every request passes.
#[derive(Debug, Clone, Copy)]
pub struct CronAuth;

#[async_trait]
impl FromRequestParts<AppState> for CronAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(secret) = state.config.dispatch.cron_secret() else {
            return Ok(CronAuth);
        };

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Unauthorized("Missing cron credentials".to_string()))?;

        if !secrets_match(bearer.token(), secret) {
            tracing::warn!("Rejected cron trigger with wrong secret");
            return Err(ApiError::Unauthorized("Invalid cron credentials".to_string()));
        }
        Ok(CronAuth)
    }
}
