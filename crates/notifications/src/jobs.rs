//! Single passes of the periodic notification jobs.
//!
//! Both jobs are safe to run concurrently with themselves: a reminder is
//! only sent after its `(booking, kind)` ledger row was inserted by this
//! pass, and an invoice is only followed up after this pass flipped it to
//! `overdue`. Delivery is at most once; a failed send is logged, not retried.

use photopro_core::invoice::{format_amount, overdue_body};
use photopro_core::reminders::{is_due, reminder_body, ReminderKind};
use photopro_core::types::Timestamp;
use photopro_db::models::booking::BookingWithClient;
use photopro_db::models::invoice::OverdueInvoice;
use photopro_db::repositories::{BookingReminderRepo, BookingRepo, InvoiceRepo};
use photopro_db::DbPool;
use serde::Serialize;

use crate::email::EmailDelivery;

/// Maximum bookings examined per reminder kind in one pass.
pub const REMINDER_BATCH_LIMIT: i64 = 500;

/// Maximum invoices flipped to overdue in one pass.
pub const OVERDUE_BATCH_LIMIT: i64 = 500;

/// Greeting used when a booking or invoice has no client name.
const FALLBACK_CLIENT_NAME: &str = "there";

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// Counts from one reminder pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReminderRunSummary {
    /// Reminders claimed by this pass.
    pub claimed: usize,
    /// Claimed reminders that were emailed.
    pub emailed: usize,
    /// Claimed reminders with no mailer configured or no client address.
    pub skipped: usize,
    /// Claimed reminders whose email failed.
    pub failed: usize,
}

/// Counts from one overdue-invoice pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OverdueRunSummary {
    /// Invoices moved from `sent` to `overdue` by this pass.
    pub flipped: usize,
    pub emailed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// What happened to one outbound notification.
enum Delivery {
    Emailed,
    Skipped,
    Failed,
}

// ---------------------------------------------------------------------------
// Booking reminders
// ---------------------------------------------------------------------------

/// Send every reminder that is due at `now` and has not been sent before.
pub async fn send_booking_reminders(
    pool: &DbPool,
    mailer: Option<&EmailDelivery>,
    now: Timestamp,
) -> Result<ReminderRunSummary, sqlx::Error> {
    let mut summary = ReminderRunSummary::default();

    for kind in ReminderKind::ALL {
        let (after, until) = kind.due_window(now);
        let due =
            BookingRepo::list_due_for_reminder(pool, kind.as_str(), after, until, REMINDER_BATCH_LIMIT)
                .await?;

        for booking in &due {
            let eligible = booking
                .status()
                .is_ok_and(|status| is_due(kind, status, booking.start_time, now));
            if !eligible {
                continue;
            }

            let recipient = booking
                .client_email
                .as_deref()
                .filter(|email| !email.trim().is_empty());
            if !BookingReminderRepo::claim(pool, booking.id, kind, recipient).await? {
                // Claimed by a concurrent pass.
                continue;
            }
            summary.claimed += 1;

            match deliver_reminder(mailer, recipient, kind, booking).await {
                Delivery::Emailed => summary.emailed += 1,
                Delivery::Skipped => summary.skipped += 1,
                Delivery::Failed => summary.failed += 1,
            }
        }
    }

    if summary.claimed > 0 {
        tracing::info!(
            claimed = summary.claimed,
            emailed = summary.emailed,
            skipped = summary.skipped,
            failed = summary.failed,
            "Booking reminder pass complete"
        );
    }
    Ok(summary)
}

async fn deliver_reminder(
    mailer: Option<&EmailDelivery>,
    recipient: Option<&str>,
    kind: ReminderKind,
    booking: &BookingWithClient,
) -> Delivery {
    let (Some(mailer), Some(to)) = (mailer, recipient) else {
        tracing::debug!(
            booking_id = booking.id,
            reminder = %kind,
            has_recipient = recipient.is_some(),
            "Reminder recorded without email"
        );
        return Delivery::Skipped;
    };

    let body = reminder_body(
        kind,
        booking.client_name.as_deref().unwrap_or(FALLBACK_CLIENT_NAME),
        &booking.title,
        booking.start_time,
        booking.location.as_deref(),
    );
    match mailer.send(to, &kind.subject(&booking.title), &body).await {
        Ok(()) => Delivery::Emailed,
        Err(e) => {
            tracing::error!(
                booking_id = booking.id,
                reminder = %kind,
                error = %e,
                "Failed to send booking reminder"
            );
            Delivery::Failed
        }
    }
}

// ---------------------------------------------------------------------------
// Overdue invoices
// ---------------------------------------------------------------------------

/// Flip past-due `sent` invoices to `overdue` and email each client once.
pub async fn mark_overdue_invoices(
    pool: &DbPool,
    mailer: Option<&EmailDelivery>,
    now: Timestamp,
) -> Result<OverdueRunSummary, sqlx::Error> {
    let flipped = InvoiceRepo::claim_overdue(pool, now, OVERDUE_BATCH_LIMIT).await?;

    let mut summary = OverdueRunSummary {
        flipped: flipped.len(),
        ..Default::default()
    };
    for invoice in &flipped {
        match deliver_overdue_notice(mailer, invoice).await {
            Delivery::Emailed => summary.emailed += 1,
            Delivery::Skipped => summary.skipped += 1,
            Delivery::Failed => summary.failed += 1,
        }
    }

    if summary.flipped > 0 {
        tracing::info!(
            flipped = summary.flipped,
            emailed = summary.emailed,
            failed = summary.failed,
            "Overdue invoice pass complete"
        );
    }
    Ok(summary)
}

async fn deliver_overdue_notice(mailer: Option<&EmailDelivery>, invoice: &OverdueInvoice) -> Delivery {
    let recipient = invoice
        .client_email
        .as_deref()
        .filter(|email| !email.trim().is_empty());
    let (Some(mailer), Some(to)) = (mailer, recipient) else {
        tracing::debug!(invoice_id = invoice.id, "Overdue invoice recorded without email");
        return Delivery::Skipped;
    };

    let outstanding = (invoice.total_cents - invoice.amount_paid_cents).max(0);
    let body = overdue_body(
        invoice.client_name.as_deref().unwrap_or(FALLBACK_CLIENT_NAME),
        &invoice.invoice_number,
        &format_amount(outstanding, &invoice.currency),
    );
    let subject = format!("Invoice {} is past due", invoice.invoice_number);
    match mailer.send(to, &subject, &body).await {
        Ok(()) => Delivery::Emailed,
        Err(e) => {
            tracing::error!(invoice_id = invoice.id, error = %e, "Failed to send overdue notice");
            Delivery::Failed
        }
    }
}

