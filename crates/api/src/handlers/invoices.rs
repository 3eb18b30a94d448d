//! Handlers for invoices.
//!
//! Invoices are created as drafts, moved to `sent` here, and from then on
//! change status only through payment reconciliation and the overdue job.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use photopro_core::error::CoreError;
use photopro_core::invoice::{format_amount, validate_amount, InvoiceStatus};
use photopro_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use photopro_core::types::DbId;
use photopro_db::models::invoice::{CreateInvoice, Invoice};
use photopro_db::models::payment::Payment;
use photopro_db::repositories::invoice_repo::DEFAULT_CURRENCY;
use photopro_db::repositories::{ClientRepo, InvoiceRepo, PaymentRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /invoices`.
#[derive(Debug, Deserialize)]
pub struct InvoiceListParams {
    pub status: Option<InvoiceStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// An invoice with the payments recorded against it.
#[derive(Debug, Serialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub payments: Vec<Payment>,
}

/// GET /api/v1/invoices
pub async fn list_invoices(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<InvoiceListParams>,
) -> AppResult<impl IntoResponse> {
    let invoices = InvoiceRepo::list(
        &state.pool,
        auth.organization_id,
        params.status,
        clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT),
        clamp_offset(params.offset),
    )
    .await?;

    Ok(Json(DataResponse { data: invoices }))
}

/// GET /api/v1/invoices/{id}
pub async fn get_invoice(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(invoice_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let invoice = InvoiceRepo::find(&state.pool, auth.organization_id, invoice_id)
        .await?
        .ok_or_else(|| AppError::not_found("Invoice", invoice_id))?;
    let payments = PaymentRepo::list_for_invoice(&state.pool, invoice.id).await?;

    Ok(Json(DataResponse {
        data: InvoiceDetail { invoice, payments },
    }))
}

/// POST /api/v1/invoices
pub async fn create_invoice(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateInvoice>,
) -> AppResult<impl IntoResponse> {
    if input.invoice_number.trim().is_empty() {
        return Err(AppError::BadRequest("invoice_number must not be empty".into()));
    }
    validate_amount(
        input.total_cents,
        input.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
    )?;
    if let Some(client_id) = input.client_id {
        if ClientRepo::find(&state.pool, auth.organization_id, client_id)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Client {client_id} does not exist"
            ))));
        }
    }

    let invoice = InvoiceRepo::create(&state.pool, auth.organization_id, &input).await?;

    tracing::info!(
        invoice_id = invoice.id,
        organization_id = auth.organization_id,
        user_id = auth.user_id,
        "Invoice created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: invoice })))
}

/// POST /api/v1/invoices/{id}/send
///
/// Move a draft invoice to `sent` and, when email is configured and the
/// client has an address, notify the client. Non-draft invoices are a 409.
pub async fn send_invoice(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(invoice_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let Some(invoice) = InvoiceRepo::mark_sent(&state.pool, auth.organization_id, invoice_id).await?
    else {
        let existing = InvoiceRepo::find(&state.pool, auth.organization_id, invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found("Invoice", invoice_id))?;
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Invoice is {} and cannot be sent",
            existing.status
        ))));
    };

    tracing::info!(invoice_id, user_id = auth.user_id, "Invoice sent");
    notify_client(&state, &invoice).await;

    Ok(Json(DataResponse { data: invoice }))
}

/// Email the invoice's client.
///
/// Runs after the invoice is already `sent`, so lookup and delivery failures
/// are logged and never fail the request.
async fn notify_client(state: &AppState, invoice: &Invoice) {
    let (Some(mailer), Some(client_id)) = (state.mailer.as_deref(), invoice.client_id) else {
        return;
    };
    let client = match ClientRepo::find(&state.pool, invoice.organization_id, client_id).await {
        Ok(Some(client)) => client,
        Ok(None) => return,
        Err(e) => {
            tracing::error!(invoice_id = invoice.id, error = %e, "Failed to load invoice client");
            return;
        }
    };
    let Some(email) = client.email.as_deref().filter(|e| !e.trim().is_empty()) else {
        return;
    };

    let subject = format!("Invoice {}", invoice.invoice_number);
    let body = format!(
        "Hi {},\n\nInvoice {} for {} is ready.\n",
        client.full_name,
        invoice.invoice_number,
        format_amount(invoice.total_cents, &invoice.currency),
    );
    if let Err(e) = mailer.send(email, &subject, &body).await {
        tracing::error!(invoice_id = invoice.id, error = %e, "Failed to email invoice");
    }
}
