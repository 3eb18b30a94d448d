//! Handlers for calendar subscription feeds.
//!
//! The public feed endpoint is authenticated only by its opaque token and
//! answers in `text/calendar`; the management endpoints require
//! [`AuthUser`]. Org-wide feeds are managed by owners and admins, personal
//! feeds by the member they belong to.

use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use photopro_core::calendar_feed::{
    content_disposition, event_description, event_summary, event_url, feed_url, feed_window,
    generate_feed_token, is_plausible_token, normalize_token, validate_feed_name,
    validate_timezone, DEFAULT_FEED_NAME, DEFAULT_FEED_TIMEZONE, FEED_CACHE_CONTROL,
    FEED_CONTENT_TYPE,
};
use photopro_core::error::CoreError;
use photopro_core::ical::{CalendarBuilder, FeedEvent};
use photopro_core::types::DbId;
use photopro_db::models::booking::BookingWithClient;
use photopro_db::models::calendar_feed::{CalendarFeed, CreateCalendarFeed};
use photopro_db::repositories::{BookingRepo, CalendarFeedRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::is_admin_role;
use crate::response::DataResponse;
use crate::state::AppState;

/// Plain-text body for unknown or inactive feed tokens.
const FEED_NOT_FOUND: &str = "Calendar feed not found";

// ---------------------------------------------------------------------------
// Public feed
// ---------------------------------------------------------------------------

/// GET /api/v1/calendar/feed/{token}
///
/// Serve the iCalendar document for a feed token. The token may carry an
/// `.ics` suffix. Every successful fetch records `last_accessed_at`.
pub async fn get_feed(
    State(state): State<AppState>,
    Path(raw_token): Path<String>,
) -> AppResult<Response> {
    let token = normalize_token(&raw_token);
    if !is_plausible_token(token) {
        return Ok(feed_not_found());
    }

    let now = Utc::now();
    let Some(feed) = CalendarFeedRepo::access_by_token(&state.pool, token, now).await? else {
        tracing::debug!("Calendar feed token not found or inactive");
        return Ok(feed_not_found());
    };

    let (from, to) = feed_window(now);
    let bookings =
        BookingRepo::list_for_feed(&state.pool, feed.organization_id, feed.user_id, from, to)
            .await?;

    let app_url = state.config.app_url.as_deref();
    let mut calendar = CalendarBuilder::new(&feed.name, &feed.timezone, now);
    for booking in &bookings {
        calendar.push_event(&project_event(booking, app_url)?);
    }

    tracing::info!(
        feed_id = feed.id,
        organization_id = feed.organization_id,
        event_count = calendar.event_count(),
        "Calendar feed served",
    );

    let headers = [
        (CONTENT_TYPE, FEED_CONTENT_TYPE.to_string()),
        (CONTENT_DISPOSITION, content_disposition()),
        (CACHE_CONTROL, FEED_CACHE_CONTROL.to_string()),
    ];
    Ok((StatusCode::OK, headers, calendar.finish()).into_response())
}

fn feed_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        FEED_NOT_FOUND,
    )
        .into_response()
}

/// Map a booking row onto the fields of one `VEVENT`.
fn project_event(booking: &BookingWithClient, app_url: Option<&str>) -> AppResult<FeedEvent> {
    let status = booking
        .status()
        .map_err(|e| AppError::InternalError(format!("booking {}: {e}", booking.id)))?;

    Ok(FeedEvent {
        id: booking.id,
        summary: event_summary(&booking.title, booking.client_name.as_deref()),
        description: event_description(
            booking.description.as_deref(),
            booking.client_email.as_deref(),
            booking.client_phone.as_deref(),
        ),
        location: booking.location.clone(),
        url: app_url.map(|base| event_url(base, booking.id)),
        start: booking.start_time,
        end: booking.end_time,
        status: status.ical_status(),
        created: booking.created_at,
        last_modified: booking.updated_at,
    })
}

// ---------------------------------------------------------------------------
// Feed management
// ---------------------------------------------------------------------------

/// A feed together with its subscription URL.
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    #[serde(flatten)]
    pub feed: CalendarFeed,
    pub url: String,
}

impl FeedResponse {
    fn new(feed: CalendarFeed, state: &AppState) -> Self {
        let url = feed_url(&state.config.public_base_url, &feed.token);
        Self { feed, url }
    }
}

/// GET /api/v1/calendar-feeds
///
/// List the feeds visible to the caller: all of the organization's feeds for
/// owners and admins, org-wide feeds plus their own for members.
pub async fn list_feeds(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let feeds = CalendarFeedRepo::list_for_org(&state.pool, auth.organization_id).await?;
    let admin = is_admin_role(&auth.role);

    let data: Vec<FeedResponse> = feeds
        .into_iter()
        .filter(|feed| admin || feed.user_id.is_none() || feed.user_id == Some(auth.user_id))
        .map(|feed| FeedResponse::new(feed, &state))
        .collect();

    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/calendar-feeds
///
/// Create a feed. `personal: true` scopes it to bookings assigned to the
/// caller; org-wide feeds require the owner or admin role.
pub async fn create_feed(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCalendarFeed>,
) -> AppResult<impl IntoResponse> {
    if !input.personal && !is_admin_role(&auth.role) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only owners and admins can create organization-wide feeds".into(),
        )));
    }

    let name = validate_feed_name(input.name.as_deref().unwrap_or(DEFAULT_FEED_NAME))?;
    let timezone = input
        .timezone
        .as_deref()
        .map(str::trim)
        .unwrap_or(DEFAULT_FEED_TIMEZONE);
    validate_timezone(timezone)?;

    let user_id = input.personal.then_some(auth.user_id);
    let token = generate_feed_token();
    let feed = CalendarFeedRepo::create(
        &state.pool,
        auth.organization_id,
        user_id,
        &token,
        &name,
        timezone,
    )
    .await?;

    tracing::info!(
        feed_id = feed.id,
        organization_id = auth.organization_id,
        user_id = auth.user_id,
        personal = input.personal,
        "Calendar feed created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: FeedResponse::new(feed, &state),
        }),
    ))
}

/// POST /api/v1/calendar-feeds/{id}/regenerate
///
/// Replace the feed token. Subscribers using the old URL get 404 from now on.
pub async fn regenerate_feed(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(feed_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_manageable(&state, &auth, feed_id).await?;

    let feed = CalendarFeedRepo::regenerate_token(
        &state.pool,
        auth.organization_id,
        feed_id,
        &generate_feed_token(),
    )
    .await?
    .ok_or_else(|| AppError::not_found("CalendarFeed", feed_id))?;

    tracing::info!(feed_id, user_id = auth.user_id, "Calendar feed token regenerated");

    Ok(Json(DataResponse {
        data: FeedResponse::new(feed, &state),
    }))
}

/// POST /api/v1/calendar-feeds/{id}/deactivate
///
/// Stop serving the feed without deleting it.
pub async fn deactivate_feed(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(feed_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_manageable(&state, &auth, feed_id).await?;

    let feed = CalendarFeedRepo::deactivate(&state.pool, auth.organization_id, feed_id)
        .await?
        .ok_or_else(|| AppError::not_found("CalendarFeed", feed_id))?;

    tracing::info!(feed_id, user_id = auth.user_id, "Calendar feed deactivated");

    Ok(Json(DataResponse {
        data: FeedResponse::new(feed, &state),
    }))
}

/// DELETE /api/v1/calendar-feeds/{id}
pub async fn delete_feed(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(feed_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_manageable(&state, &auth, feed_id).await?;

    if !CalendarFeedRepo::delete(&state.pool, auth.organization_id, feed_id).await? {
        return Err(AppError::not_found("CalendarFeed", feed_id));
    }

    tracing::info!(feed_id, user_id = auth.user_id, "Calendar feed deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// 404 unless the feed is in the caller's organization, 403 unless the
/// caller is an owner/admin or the feed's own member.
async fn ensure_manageable(state: &AppState, auth: &AuthUser, feed_id: DbId) -> AppResult<()> {
    let feed = CalendarFeedRepo::find(&state.pool, auth.organization_id, feed_id)
        .await?
        .ok_or_else(|| AppError::not_found("CalendarFeed", feed_id))?;

    if !is_admin_role(&auth.role) && feed.user_id != Some(auth.user_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only manage your own calendar feeds".into(),
        )));
    }
    Ok(())
}
