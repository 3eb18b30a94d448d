//! Authentication for scheduler-triggered endpoints.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use photopro_core::error::CoreError;
use photopro_core::webhook_signature::constant_time_eq;

use super::auth::bearer_token;
use crate::error::AppError;
use crate::state::AppState;

/// Proof that the request carried `Authorization: Bearer <CRON_SECRET>`.
pub struct CronAuth;

impl FromRequestParts<AppState> for CronAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let expected = state.config.secrets.cron_secret.as_bytes();
        if !constant_time_eq(token.as_bytes(), expected) {
            tracing::warn!("Rejected cron request with wrong secret");
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid cron secret".into(),
            )));
        }
        Ok(CronAuth)
    }
}
