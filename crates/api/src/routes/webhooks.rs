//! Route definitions for inbound vendor webhooks.
//!
//! These routes carry no bearer auth; each handler verifies the vendor's
//! HMAC signature over the raw body instead.

use axum::routing::post;
use axum::Router;

use crate::handlers::webhooks;
use crate::state::AppState;

/// Webhook routes mounted at `/webhooks`.
///
/// ```text
/// POST   /payments              -> payments_webhook
/// POST   /identity              -> identity_webhook
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payments", post(webhooks::payments_webhook))
        .route("/identity", post(webhooks::identity_webhook))
}
