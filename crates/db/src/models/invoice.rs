//! Invoices and the overdue projection used by follow-up jobs.

use photopro_core::error::CoreError;
use photopro_core::invoice::InvoiceStatus;
use photopro_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `invoices` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invoice {
    pub id: DbId,
    pub organization_id: DbId,
    pub client_id: Option<DbId>,
    pub invoice_number: String,
    pub status: String,
    pub currency: String,
    pub total_cents: i64,
    pub amount_paid_cents: i64,
    pub due_date: Option<Timestamp>,
    pub paid_at: Option<Timestamp>,
    pub overdue_notified_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Invoice {
    /// Parse the stored status string.
    pub fn status(&self) -> Result<InvoiceStatus, CoreError> {
        self.status.parse()
    }

    /// Amount still owed, never negative.
    pub fn outstanding_cents(&self) -> i64 {
        (self.total_cents - self.amount_paid_cents).max(0)
    }
}

/// DTO for creating an invoice.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoice {
    pub client_id: Option<DbId>,
    pub invoice_number: String,
    pub currency: Option<String>,
    pub total_cents: i64,
    pub due_date: Option<Timestamp>,
}

/// An invoice that was just flipped to `overdue`, joined with its client.
#[derive(Debug, Clone, FromRow)]
pub struct OverdueInvoice {
    pub id: DbId,
    pub organization_id: DbId,
    pub invoice_number: String,
    pub currency: String,
    pub total_cents: i64,
    pub amount_paid_cents: i64,
    pub due_date: Option<Timestamp>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
}
