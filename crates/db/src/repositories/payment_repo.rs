//! Repository for the `payments` table and payment reconciliation.
//!
//! Reconciliation runs in a transaction: the payment row is the idempotency
//! key (unique `external_session_id`), and the invoice row is locked while
//! its paid amount and status are recomputed.

use photopro_core::invoice::status_after_balance_change;
use photopro_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use super::invoice_repo::COLUMNS as INVOICE_COLUMNS;
use crate::models::invoice::Invoice;
use crate::models::payment::{NewPayment, Payment, ReconcileOutcome, PAYMENT_REFUNDED};

const COLUMNS: &str = "\
    id, organization_id, invoice_id, amount_cents, currency, external_session_id, \
    external_payment_intent, status, refunded_cents, refunded_at, created_at";

/// Provides payment queries and invoice reconciliation.
pub struct PaymentRepo;

impl PaymentRepo {
    /// Find a payment by the vendor checkout session id.
    pub async fn find_by_session(
        pool: &PgPool,
        external_session_id: &str,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments WHERE external_session_id = $1");
        sqlx::query_as::<_, Payment>(&query)
            .bind(external_session_id)
            .fetch_optional(pool)
            .await
    }

    /// List payments recorded against an invoice.
    pub async fn list_for_invoice(
        pool: &PgPool,
        invoice_id: DbId,
    ) -> Result<Vec<Payment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payments WHERE invoice_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(invoice_id)
            .fetch_all(pool)
            .await
    }

    /// Record a completed checkout and apply it to its invoice.
    ///
    /// - Unknown invoice: [`ReconcileOutcome::NotFound`], nothing written.
    /// - Session already recorded: [`ReconcileOutcome::Duplicate`].
    /// - Otherwise the payment is inserted, `amount_paid_cents` increased and
    ///   the invoice status recomputed (`paid` once fully covered).
    pub async fn record_checkout(
        pool: &PgPool,
        input: &NewPayment,
        now: Timestamp,
    ) -> Result<ReconcileOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let invoice_query = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1 FOR UPDATE");
        let Some(invoice) = sqlx::query_as::<_, Invoice>(&invoice_query)
            .bind(input.invoice_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(ReconcileOutcome::NotFound);
        };

        let insert = format!(
            "INSERT INTO payments \
                 (organization_id, invoice_id, amount_cents, currency, external_session_id, \
                  external_payment_intent) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT ON CONSTRAINT uq_payments_external_session_id DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let Some(payment) = sqlx::query_as::<_, Payment>(&insert)
            .bind(invoice.organization_id)
            .bind(invoice.id)
            .bind(input.amount_cents)
            .bind(&input.currency)
            .bind(&input.external_session_id)
            .bind(&input.external_payment_intent)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(ReconcileOutcome::Duplicate);
        };

        let paid = invoice.amount_paid_cents + payment.amount_cents;
        let invoice = Self::apply_balance(&mut tx, &invoice, paid, now).await?;

        tx.commit().await?;
        Ok(ReconcileOutcome::Applied { payment, invoice })
    }

    /// Apply a refund for `payment_intent` to its payment and invoice.
    ///
    /// `refunded_cents` is the cumulative amount refunded on the charge
    /// (capped at the payment amount). Only the part not yet applied is taken
    /// off the invoice; the payment becomes `refunded` once fully refunded.
    /// A total that adds nothing yields [`ReconcileOutcome::Duplicate`].
    pub async fn record_refund(
        pool: &PgPool,
        payment_intent: &str,
        refunded_cents: i64,
        now: Timestamp,
    ) -> Result<ReconcileOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let find = format!(
            "SELECT {COLUMNS} FROM payments WHERE external_payment_intent = $1 \
             ORDER BY id ASC LIMIT 1 FOR UPDATE"
        );
        let Some(existing) = sqlx::query_as::<_, Payment>(&find)
            .bind(payment_intent)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(ReconcileOutcome::NotFound);
        };

        let total_refunded = refunded_cents.clamp(0, existing.amount_cents);
        let delta = total_refunded - existing.refunded_cents;
        if delta <= 0 {
            return Ok(ReconcileOutcome::Duplicate);
        }

        let update = format!(
            "UPDATE payments SET \
                 refunded_cents = $2, \
                 status = CASE WHEN $2 >= amount_cents THEN '{PAYMENT_REFUNDED}' ELSE status END, \
                 refunded_at = $3 \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let payment = sqlx::query_as::<_, Payment>(&update)
            .bind(existing.id)
            .bind(total_refunded)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        let invoice_query = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1 FOR UPDATE");
        let invoice = sqlx::query_as::<_, Invoice>(&invoice_query)
            .bind(payment.invoice_id)
            .fetch_one(&mut *tx)
            .await?;

        let paid = (invoice.amount_paid_cents - delta).max(0);
        let invoice = Self::apply_balance(&mut tx, &invoice, paid, now).await?;

        tx.commit().await?;
        Ok(ReconcileOutcome::Applied { payment, invoice })
    }

    /// Write a new paid amount and the status it implies.
    async fn apply_balance(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        invoice: &Invoice,
        paid_cents: i64,
        now: Timestamp,
    ) -> Result<Invoice, sqlx::Error> {
        let current = invoice
            .status()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let next = status_after_balance_change(
            current,
            invoice.total_cents,
            paid_cents,
            invoice.due_date,
            now,
        );

        let query = format!(
            "UPDATE invoices SET \
                 amount_paid_cents = $2, \
                 status = $3, \
                 paid_at = CASE WHEN $3 = 'paid' THEN COALESCE(paid_at, $4) ELSE NULL END \
             WHERE id = $1 \
             RETURNING {INVOICE_COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(invoice.id)
            .bind(paid_cents)
            .bind(next.as_str())
            .bind(now)
            .fetch_one(&mut **tx)
            .await
    }
}
