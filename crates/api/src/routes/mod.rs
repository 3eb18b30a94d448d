pub mod bookings;
pub mod calendar_feed;
pub mod clients;
pub mod cron;
pub mod health;
pub mod invoices;
pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /calendar/feed/{token}                           iCalendar feed (public, token auth)
///
/// /calendar-feeds                                  list, create (auth required)
/// /calendar-feeds/{id}                             delete
/// /calendar-feeds/{id}/regenerate                  rotate token (POST)
/// /calendar-feeds/{id}/deactivate                  stop serving (POST)
///
/// /bookings                                        list, create (auth required)
/// /bookings/{id}                                   get, update, delete
/// /bookings/{id}/status                            change status (PUT)
///
/// /clients                                         list, create (auth required)
/// /clients/{id}                                    get, update, delete
///
/// /invoices                                        list, create (auth required)
/// /invoices/{id}                                   get (with payments)
/// /invoices/{id}/send                              mark sent and email client (POST)
///
/// /webhooks/payments                               payment events (signed)
/// /webhooks/identity                               organization/user events (signed)
///
/// /cron/booking-reminders                          reminder pass (cron secret)
/// /cron/invoice-overdue                            overdue pass (cron secret)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/calendar", calendar_feed::public_router())
        .nest("/calendar-feeds", calendar_feed::router())
        .nest("/bookings", bookings::router())
        .nest("/clients", clients::router())
        .nest("/invoices", invoices::router())
        .nest("/webhooks", webhooks::router())
        .nest("/cron", cron::router())
}
