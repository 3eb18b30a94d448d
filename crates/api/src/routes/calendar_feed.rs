//! Route definitions for calendar feeds.
//!
//! Two routers are provided:
//! - `public_router()` for the token-authenticated feed mounted at `/calendar`
//! - `router()` for feed management mounted at `/calendar-feeds`

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::calendar_feed;
use crate::state::AppState;

/// Public feed routes mounted at `/calendar`.
///
/// ```text
/// GET    /feed/{token}          -> get_feed
/// ```
pub fn public_router() -> Router<AppState> {
    Router::new().route("/feed/{token}", get(calendar_feed::get_feed))
}

/// Feed management routes mounted at `/calendar-feeds`.
///
/// ```text
/// GET    /                      -> list_feeds
/// POST   /                      -> create_feed
/// DELETE /{id}                  -> delete_feed
/// POST   /{id}/regenerate       -> regenerate_feed
/// POST   /{id}/deactivate       -> deactivate_feed
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(calendar_feed::list_feeds).post(calendar_feed::create_feed),
        )
        .route("/{id}", delete(calendar_feed::delete_feed))
        .route("/{id}/regenerate", post(calendar_feed::regenerate_feed))
        .route("/{id}/deactivate", post(calendar_feed::deactivate_feed))
}
