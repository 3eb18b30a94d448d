use axum::routing::post;
use axum::Router;

use crate::handlers::cron;
use crate::state::AppState;

/// Job routes mounted at `/cron`, authenticated by the cron secret.
///
/// ```text
/// POST   /booking-reminders     -> run_booking_reminders
/// POST   /invoice-overdue       -> run_invoice_overdue
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/booking-reminders", post(cron::run_booking_reminders))
        .route("/invoice-overdue", post(cron::run_invoice_overdue))
}
