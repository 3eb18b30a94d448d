//! Repository for the `invoices` table.

use photopro_core::invoice::InvoiceStatus;
use photopro_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::invoice::{CreateInvoice, Invoice, OverdueInvoice};

pub(crate) const COLUMNS: &str = "\
    id, organization_id, client_id, invoice_number, status, currency, total_cents, \
    amount_paid_cents, due_date, paid_at, overdue_notified_at, created_at, updated_at";

/// Default currency for new invoices.
pub const DEFAULT_CURRENCY: &str = "usd";

/// Provides tenant-scoped invoice queries and the overdue sweep.
pub struct InvoiceRepo;

impl InvoiceRepo {
    /// Insert a new draft invoice.
    pub async fn create(
        pool: &PgPool,
        organization_id: DbId,
        input: &CreateInvoice,
    ) -> Result<Invoice, sqlx::Error> {
        let query = format!(
            "INSERT INTO invoices \
                 (organization_id, client_id, invoice_number, currency, total_cents, due_date) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        let currency = input
            .currency
            .as_deref()
            .unwrap_or(DEFAULT_CURRENCY)
            .to_ascii_lowercase();
        sqlx::query_as::<_, Invoice>(&query)
            .bind(organization_id)
            .bind(input.client_id)
            .bind(input.invoice_number.trim())
            .bind(currency)
            .bind(input.total_cents)
            .bind(input.due_date)
            .fetch_one(pool)
            .await
    }

    /// List invoices, newest first, optionally filtered by status.
    pub async fn list(
        pool: &PgPool,
        organization_id: DbId,
        status: Option<InvoiceStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Invoice>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invoices \
             WHERE organization_id = $1 AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(organization_id)
            .bind(status.map(InvoiceStatus::as_str))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Find an invoice by id within an organization.
    pub async fn find(
        pool: &PgPool,
        organization_id: DbId,
        id: DbId,
    ) -> Result<Option<Invoice>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM invoices WHERE id = $1 AND organization_id = $2");
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// Move a draft invoice to `sent`. Returns `None` if the invoice does not
    /// exist or is not a draft.
    pub async fn mark_sent(
        pool: &PgPool,
        organization_id: DbId,
        id: DbId,
    ) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!(
            "UPDATE invoices SET status = 'sent' \
             WHERE id = $1 AND organization_id = $2 AND status = 'draft' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// Flip `sent` invoices whose due date has passed to `overdue`.
    ///
    /// Each invoice is flipped (and returned) at most once: the update is
    /// conditional on `overdue_notified_at IS NULL` and stamps it, and
    /// concurrent sweeps skip rows another sweep has locked.
    pub async fn claim_overdue(
        pool: &PgPool,
        now: Timestamp,
        limit: i64,
    ) -> Result<Vec<OverdueInvoice>, sqlx::Error> {
        sqlx::query_as::<_, OverdueInvoice>(
            "WITH flipped AS ( \
                 UPDATE invoices SET status = 'overdue', overdue_notified_at = $1 \
                 WHERE id IN ( \
                     SELECT id FROM invoices \
                     WHERE status = 'sent' \
                       AND due_date IS NOT NULL \
                       AND due_date < $1 \
                       AND overdue_notified_at IS NULL \
                     ORDER BY due_date ASC \
                     LIMIT $2 \
                     FOR UPDATE SKIP LOCKED \
                 ) \
                 RETURNING id, organization_id, client_id, invoice_number, currency, \
                           total_cents, amount_paid_cents, due_date \
             ) \
             SELECT f.id, f.organization_id, f.invoice_number, f.currency, f.total_cents, \
                    f.amount_paid_cents, f.due_date, \
                    c.full_name AS client_name, c.email AS client_email \
             FROM flipped f \
             LEFT JOIN clients c ON c.id = f.client_id \
             ORDER BY f.due_date ASC",
        )
        .bind(now)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
