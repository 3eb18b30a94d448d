//! Invoice status rules applied by payment reconciliation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Invoice status as stored in `invoices.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 5] = [
        InvoiceStatus::Draft,
        InvoiceStatus::Sent,
        InvoiceStatus::Paid,
        InvoiceStatus::Overdue,
        InvoiceStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the invoice can still receive payments.
    pub fn accepts_payment(self) -> bool {
        matches!(
            self,
            InvoiceStatus::Draft | InvoiceStatus::Sent | InvoiceStatus::Overdue | InvoiceStatus::Paid
        )
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InvoiceStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown invoice status '{s}'")))
    }
}

/// Status an invoice moves to after its paid amount changes.
///
/// A fully paid invoice is `paid`. A partially paid (or refunded) invoice
/// returns to `overdue` when past its due date and `sent` otherwise; a
/// draft with no money received stays a draft.
pub fn status_after_balance_change(
    current: InvoiceStatus,
    total_cents: i64,
    paid_cents: i64,
    due_date: Option<Timestamp>,
    now: Timestamp,
) -> InvoiceStatus {
    if current == InvoiceStatus::Cancelled {
        return current;
    }
    if paid_cents >= total_cents {
        return InvoiceStatus::Paid;
    }
    if current == InvoiceStatus::Draft && paid_cents == 0 {
        return InvoiceStatus::Draft;
    }
    match due_date {
        Some(due) if due < now => InvoiceStatus::Overdue,
        _ => InvoiceStatus::Sent,
    }
}

/// Validate a new invoice's amount and currency.
pub fn validate_amount(total_cents: i64, currency: &str) -> Result<(), CoreError> {
    if total_cents <= 0 {
        return Err(CoreError::Validation(
            "total_cents must be positive".into(),
        ));
    }
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CoreError::Validation(format!(
            "Invalid currency code '{currency}'"
        )));
    }
    Ok(())
}

/// Render an amount in minor units, e.g. `12345, "usd"` -> `USD 123.45`.
pub fn format_amount(cents: i64, currency: &str) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!(
        "{} {sign}{}.{:02}",
        currency.to_ascii_uppercase(),
        abs / 100,
        abs % 100
    )
}

/// Plain-text follow-up sent when an invoice becomes overdue.
pub fn overdue_body(client_name: &str, invoice_number: &str, outstanding: &str) -> String {
    format!(
        "Hi {client_name},\n\nInvoice {invoice_number} is now past due. \
         The outstanding balance is {outstanding}.\n\n\
         If you have already paid, please disregard this message.\n"
    )
}
