//! Session-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use photopro_core::error::CoreError;
use photopro_core::types::DbId;
use photopro_db::repositories::{OrganizationRepo, UserRepo};

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated member resolved from an identity-vendor Bearer token.
///
/// The token's `sub` must match a user provisioned through the identity
/// webhook; every tenant-scoped query uses `organization_id` from here.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, organization_id = user.organization_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Internal user id.
    pub user_id: DbId,
    /// The user's organization (tenant scope).
    pub organization_id: DbId,
    /// `owner`, `admin` or `member`.
    pub role: String,
    /// Identity vendor user id (`claims.sub`).
    pub external_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        let user = UserRepo::find_by_external_id(&state.pool, &claims.sub)
            .await?
            .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Unknown user".into())))?;

        if let Some(org_external_id) = claims.org_id.as_deref() {
            let org = OrganizationRepo::find_by_external_id(&state.pool, org_external_id).await?;
            if org.map(|o| o.id) != Some(user.organization_id) {
                return Err(AppError::Core(CoreError::Forbidden(
                    "Token organization does not match user".into(),
                )));
            }
        }

        Ok(AuthUser {
            user_id: user.id,
            organization_id: user.organization_id,
            role: user.role,
            external_id: user.external_id,
        })
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
pub(crate) fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing Authorization header".into(),
            ))
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>".into(),
        ))
    })
}
