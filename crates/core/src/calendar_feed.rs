//! Calendar feed policy: query window, tokens, response headers and the
//! text shown for each booking in a subscribed calendar.

use rand::Rng;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// How far back a feed reaches from the request time.
pub const FEED_WINDOW_PAST_DAYS: i64 = 30;

/// How far forward a feed reaches from the request time.
pub const FEED_WINDOW_FUTURE_DAYS: i64 = 365;

/// Length of a generated feed token.
pub const FEED_TOKEN_LENGTH: usize = 40;

/// `Content-Type` of a feed response.
pub const FEED_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

/// Attachment filename offered to calendar clients.
pub const FEED_FILENAME: &str = "photoproos-bookings.ics";

/// `Cache-Control` value for feed responses; subscribers must always refetch.
pub const FEED_CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";

/// Default calendar name when a feed is created without one.
pub const DEFAULT_FEED_NAME: &str = "PhotoProOS Bookings";

/// Default feed timezone.
pub const DEFAULT_FEED_TIMEZONE: &str = "UTC";

const MAX_FEED_NAME_CHARS: usize = 120;
const MAX_TIMEZONE_CHARS: usize = 64;

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// Inclusive `(from, to)` bounds on booking start times for a feed request.
pub fn feed_window(now: Timestamp) -> (Timestamp, Timestamp) {
    (
        now - chrono::Duration::days(FEED_WINDOW_PAST_DAYS),
        now + chrono::Duration::days(FEED_WINDOW_FUTURE_DAYS),
    )
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Generate a new opaque, URL-safe feed token.
pub fn generate_feed_token() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(FEED_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Strip the optional `.ics` suffix calendar clients like to append.
pub fn normalize_token(raw: &str) -> &str {
    raw.strip_suffix(".ics").unwrap_or(raw)
}

/// Whether a token could have been produced by [`generate_feed_token`].
///
/// Used to reject garbage before touching the database.
pub fn is_plausible_token(token: &str) -> bool {
    !token.is_empty() && token.len() <= 128 && token.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Public subscription URL for a feed token.
pub fn feed_url(public_base_url: &str, token: &str) -> String {
    format!(
        "{}/api/v1/calendar/feed/{token}.ics",
        public_base_url.trim_end_matches('/')
    )
}

/// `Content-Disposition` header value for a feed response.
pub fn content_disposition() -> String {
    format!("attachment; filename=\"{FEED_FILENAME}\"")
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate and normalize a feed name (trimmed, 1..=120 characters).
pub fn validate_feed_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("name must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_FEED_NAME_CHARS {
        return Err(CoreError::Validation(format!(
            "name must be at most {MAX_FEED_NAME_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate an IANA-style timezone name such as `America/Chicago`.
///
/// Only the shape is checked; the value is passed through to calendar
/// clients as `X-WR-TIMEZONE`.
pub fn validate_timezone(tz: &str) -> Result<(), CoreError> {
    if tz.is_empty() || tz.len() > MAX_TIMEZONE_CHARS {
        return Err(CoreError::Validation(
            "timezone must be 1-64 characters".into(),
        ));
    }
    if !tz
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-' | '+'))
    {
        return Err(CoreError::Validation(format!("Invalid timezone '{tz}'")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Event text
// ---------------------------------------------------------------------------

/// `SUMMARY` text: the booking title, suffixed with the client name if known.
pub fn event_summary(title: &str, client_name: Option<&str>) -> String {
    match client_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("{} - {name}", title.trim()),
        None => title.trim().to_string(),
    }
}

/// `DESCRIPTION` text: the booking notes followed by client contact lines.
///
/// Returns `None` when there is nothing to show.
pub fn event_description(
    notes: Option<&str>,
    client_email: Option<&str>,
    client_phone: Option<&str>,
) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    if let Some(notes) = notes.map(str::trim).filter(|n| !n.is_empty()) {
        parts.push(notes.to_string());
    }
    if let Some(email) = client_email.filter(|e| !e.is_empty()) {
        parts.push(format!("Email: {email}"));
    }
    if let Some(phone) = client_phone.filter(|p| !p.is_empty()) {
        parts.push(format!("Phone: {phone}"));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

/// Deep link back into the web app for a booking.
pub fn event_url(app_url: &str, booking_id: DbId) -> String {
    format!("{}/scheduling/{booking_id}", app_url.trim_end_matches('/'))
}
