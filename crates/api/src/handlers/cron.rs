//! Scheduler-triggered job endpoints.
//!
//! These run the same passes as the in-process scheduler, so an external
//! cron can drive them instead. Both jobs claim work in the database, so
//! overlapping runs never notify twice.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use photopro_notifications::jobs::{mark_overdue_invoices, send_booking_reminders};

use crate::error::AppResult;
use crate::middleware::cron::CronAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/cron/booking-reminders
pub async fn run_booking_reminders(
    _auth: CronAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let summary = send_booking_reminders(&state.pool, state.mailer.as_deref(), Utc::now()).await?;

    tracing::info!(
        claimed = summary.claimed,
        emailed = summary.emailed,
        skipped = summary.skipped,
        failed = summary.failed,
        "Cron booking reminders run",
    );

    Ok(Json(DataResponse { data: summary }))
}

/// POST /api/v1/cron/invoice-overdue
pub async fn run_invoice_overdue(
    _auth: CronAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let summary = mark_overdue_invoices(&state.pool, state.mailer.as_deref(), Utc::now()).await?;

    tracing::info!(
        flipped = summary.flipped,
        emailed = summary.emailed,
        skipped = summary.skipped,
        failed = summary.failed,
        "Cron overdue invoices run",
    );

    Ok(Json(DataResponse { data: summary }))
}
