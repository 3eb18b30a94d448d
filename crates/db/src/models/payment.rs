//! Payments recorded from payment vendor webhooks.

use photopro_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::invoice::Invoice;

pub const PAYMENT_SUCCEEDED: &str = "succeeded";
pub const PAYMENT_REFUNDED: &str = "refunded";

/// A row from the `payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: DbId,
    pub organization_id: DbId,
    pub invoice_id: DbId,
    pub amount_cents: i64,
    pub currency: String,
    pub external_session_id: String,
    pub external_payment_intent: Option<String>,
    pub status: String,
    /// Total refunded so far; `status` becomes `refunded` once it reaches `amount_cents`.
    pub refunded_cents: i64,
    /// Time of the most recent refund.
    pub refunded_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A completed checkout to be recorded against an invoice.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub invoice_id: DbId,
    pub amount_cents: i64,
    pub currency: String,
    pub external_session_id: String,
    pub external_payment_intent: Option<String>,
}

/// Result of applying a checkout or refund to an invoice.
#[derive(Debug, Clone)]
pub enum ReconcileOutcome {
    /// The payment change was applied and the invoice updated.
    Applied { payment: Payment, invoice: Invoice },
    /// The same external id was already processed; nothing changed.
    Duplicate,
    /// The referenced invoice or payment does not exist.
    NotFound,
}
