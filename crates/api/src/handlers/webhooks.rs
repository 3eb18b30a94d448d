//! Inbound vendor webhooks: payment reconciliation and identity sync.
//!
//! Every delivery is authenticated with an HMAC signature header over the
//! raw body, then recorded in `webhook_events` before it is handled. A
//! delivery whose event id was already recorded is acknowledged as a
//! duplicate without side effects. If handling fails, the record is removed
//! again so the vendor's retry is processed.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use photopro_core::error::CoreError;
use photopro_core::webhook_signature::{verify_signature, SignatureError};
use photopro_db::models::organization::UpsertOrganization;
use photopro_db::models::payment::{NewPayment, ReconcileOutcome};
use photopro_db::models::user::{UpsertUser, ROLE_ADMIN, ROLE_MEMBER, ROLE_OWNER};
use photopro_db::models::webhook_event::{PROVIDER_IDENTITY, PROVIDER_PAYMENTS};
use photopro_db::repositories::{OrganizationRepo, PaymentRepo, UserRepo, WebhookEventRepo};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::WebhookAck;
use crate::state::AppState;

/// Signature header sent by the payments vendor.
pub const PAYMENT_SIGNATURE_HEADER: &str = "x-payment-signature";

/// Signature header sent by the identity vendor.
pub const IDENTITY_SIGNATURE_HEADER: &str = "x-identity-signature";

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Common envelope of both vendors' deliveries.
#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    /// Vendor event id; the dedupe key.
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// `data.object` of `checkout.session.completed`.
#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub amount_total: i64,
    pub currency: String,
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub metadata: CheckoutMetadata,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutMetadata {
    /// Invoice id as a decimal string.
    pub invoice_id: Option<String>,
}

/// `data.object` of `charge.refunded`.
#[derive(Debug, Deserialize)]
pub struct RefundedCharge {
    pub payment_intent: Option<String>,
    pub amount_refunded: i64,
}

/// `data` of `organization.created` / `organization.updated`.
#[derive(Debug, Deserialize)]
pub struct OrganizationData {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub timezone: Option<String>,
}

/// `data` of `user.created` / `user.updated`.
#[derive(Debug, Deserialize)]
pub struct UserData {
    pub id: String,
    pub organization_id: String,
    pub email_address: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
}

/// `data` of `organization.deleted` / `user.deleted`.
#[derive(Debug, Deserialize)]
pub struct DeletedData {
    pub id: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/webhooks/payments
///
/// Handles `checkout.session.completed` and `charge.refunded`; other event
/// types are acknowledged and ignored.
pub async fn payments_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let envelope = authenticate(
        &headers,
        PAYMENT_SIGNATURE_HEADER,
        &state.config.secrets.payment_webhook_secret,
        &body,
    )?;

    if !record_delivery(&state, PROVIDER_PAYMENTS, &envelope).await? {
        return Ok(Json(WebhookAck::duplicate()));
    }
    let result = handle_payment_event(&state, &envelope).await;
    finish_delivery(&state, PROVIDER_PAYMENTS, &envelope, result).await
}

/// POST /api/v1/webhooks/identity
///
/// Keeps organizations and members in sync with the identity vendor.
pub async fn identity_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let envelope = authenticate(
        &headers,
        IDENTITY_SIGNATURE_HEADER,
        &state.config.secrets.identity_webhook_secret,
        &body,
    )?;

    if !record_delivery(&state, PROVIDER_IDENTITY, &envelope).await? {
        return Ok(Json(WebhookAck::duplicate()));
    }
    let result = handle_identity_event(&state, &envelope).await;
    finish_delivery(&state, PROVIDER_IDENTITY, &envelope, result).await
}

/// Verify the signature header and parse the envelope.
fn authenticate(
    headers: &HeaderMap,
    header_name: &str,
    secret: &str,
    body: &[u8],
) -> AppResult<WebhookEnvelope> {
    let signature = headers
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .ok_or(SignatureError::Malformed)?;
    verify_signature(secret, signature, body, Utc::now())?;

    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {e}")))
}

/// Record the delivery. `false` means the event id was seen before.
async fn record_delivery(
    state: &AppState,
    provider: &'static str,
    envelope: &WebhookEnvelope,
) -> AppResult<bool> {
    let first_delivery = WebhookEventRepo::record_once(
        &state.pool,
        provider,
        &envelope.id,
        &envelope.event_type,
    )
    .await?;
    if !first_delivery {
        tracing::info!(
            provider,
            event_id = %envelope.id,
            event_type = %envelope.event_type,
            "Duplicate webhook delivery ignored",
        );
    }
    Ok(first_delivery)
}

/// Acknowledge a handled delivery, or release it for retry on failure.
async fn finish_delivery(
    state: &AppState,
    provider: &'static str,
    envelope: &WebhookEnvelope,
    result: AppResult<()>,
) -> AppResult<Json<WebhookAck>> {
    if let Err(e) = result {
        tracing::warn!(
            provider,
            event_id = %envelope.id,
            event_type = %envelope.event_type,
            error = %e,
            "Webhook handling failed; delivery released for retry",
        );
        WebhookEventRepo::forget(&state.pool, provider, &envelope.id).await?;
        return Err(e);
    }

    tracing::debug!(provider, event_id = %envelope.id, "Webhook processed");
    Ok(Json(WebhookAck::processed()))
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

async fn handle_payment_event(state: &AppState, envelope: &WebhookEnvelope) -> AppResult<()> {
    match envelope.event_type.as_str() {
        "checkout.session.completed" => {
            let session: CheckoutSession = data_object(envelope)?;
            apply_checkout(state, session).await
        }
        "charge.refunded" => {
            let charge: RefundedCharge = data_object(envelope)?;
            apply_refund(state, charge).await
        }
        other => {
            tracing::debug!(event_type = other, "Ignoring payment event type");
            Ok(())
        }
    }
}

async fn apply_checkout(state: &AppState, session: CheckoutSession) -> AppResult<()> {
    let invoice_id = session
        .metadata
        .invoice_id
        .as_deref()
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .ok_or_else(|| {
            AppError::BadRequest("checkout session has no valid metadata.invoice_id".into())
        })?;

    let input = NewPayment {
        invoice_id,
        amount_cents: session.amount_total,
        currency: session.currency.to_ascii_lowercase(),
        external_session_id: session.id,
        external_payment_intent: session.payment_intent,
    };

    match PaymentRepo::record_checkout(&state.pool, &input, Utc::now()).await? {
        ReconcileOutcome::Applied { payment, invoice } => {
            tracing::info!(
                payment_id = payment.id,
                invoice_id = invoice.id,
                organization_id = invoice.organization_id,
                amount_cents = payment.amount_cents,
                outstanding_cents = invoice.outstanding_cents(),
                status = %invoice.status,
                "Checkout payment applied",
            );
            if !invoice.status().is_ok_and(|status| status.accepts_payment()) {
                tracing::warn!(
                    invoice_id = invoice.id,
                    status = %invoice.status,
                    "Payment recorded against an invoice that does not accept payments",
                );
            }
        }
        ReconcileOutcome::Duplicate => {
            tracing::info!(
                session_id = %input.external_session_id,
                "Checkout session already recorded",
            );
        }
        ReconcileOutcome::NotFound => {
            tracing::warn!(invoice_id, "Checkout completed for unknown invoice");
        }
    }
    Ok(())
}

async fn apply_refund(state: &AppState, charge: RefundedCharge) -> AppResult<()> {
    let Some(payment_intent) = charge.payment_intent.as_deref() else {
        tracing::warn!("Refund without payment_intent ignored");
        return Ok(());
    };

    match PaymentRepo::record_refund(&state.pool, payment_intent, charge.amount_refunded, Utc::now())
        .await?
    {
        ReconcileOutcome::Applied { payment, invoice } => {
            tracing::info!(
                payment_id = payment.id,
                invoice_id = invoice.id,
                refunded_cents = charge.amount_refunded,
                status = %invoice.status,
                "Refund applied",
            );
        }
        ReconcileOutcome::Duplicate => {
            tracing::info!(payment_intent, "Refund already applied");
        }
        ReconcileOutcome::NotFound => {
            tracing::warn!(payment_intent, "Refund for unknown payment");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

async fn handle_identity_event(state: &AppState, envelope: &WebhookEnvelope) -> AppResult<()> {
    match envelope.event_type.as_str() {
        "organization.created" | "organization.updated" => {
            let data: OrganizationData = data_field(envelope)?;
            let org = OrganizationRepo::upsert(
                &state.pool,
                &UpsertOrganization {
                    external_id: data.id,
                    name: data.name,
                    slug: data.slug,
                    timezone: data.timezone,
                },
            )
            .await?;
            tracing::info!(organization_id = org.id, external_id = %org.external_id, "Organization synced");
        }
        "organization.deleted" => {
            let data: DeletedData = data_field(envelope)?;
            let deleted = OrganizationRepo::delete_by_external_id(&state.pool, &data.id).await?;
            tracing::info!(external_id = %data.id, deleted, "Organization removed");
        }
        "user.created" | "user.updated" => {
            let data: UserData = data_field(envelope)?;
            let org = OrganizationRepo::find_by_external_id(&state.pool, &data.organization_id)
                .await?
                .ok_or_else(|| {
                    AppError::Core(CoreError::Conflict(format!(
                        "Organization {} is not provisioned yet",
                        data.organization_id
                    )))
                })?;
            let user = UserRepo::upsert(
                &state.pool,
                &UpsertUser {
                    full_name: full_name(data.first_name.as_deref(), data.last_name.as_deref()),
                    role: member_role(data.role.as_deref()).to_string(),
                    external_id: data.id,
                    organization_id: org.id,
                    email: data.email_address,
                },
            )
            .await?;
            tracing::info!(user_id = user.id, organization_id = org.id, role = %user.role, "User synced");
        }
        "user.deleted" => {
            let data: DeletedData = data_field(envelope)?;
            let deleted = UserRepo::delete_by_external_id(&state.pool, &data.id).await?;
            tracing::info!(external_id = %data.id, deleted, "User removed");
        }
        other => {
            tracing::debug!(event_type = other, "Ignoring identity event type");
        }
    }
    Ok(())
}

/// Map a vendor role (`admin`, `org:admin`, ...) onto a local role.
pub fn member_role(vendor_role: Option<&str>) -> &'static str {
    let role = vendor_role.unwrap_or_default();
    match role.strip_prefix("org:").unwrap_or(role) {
        "owner" => ROLE_OWNER,
        "admin" => ROLE_ADMIN,
        _ => ROLE_MEMBER,
    }
}

fn full_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let name = [first, last]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!name.is_empty()).then_some(name)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Deserialize `data` of an identity event.
fn data_field<T: DeserializeOwned>(envelope: &WebhookEnvelope) -> AppResult<T> {
    serde_json::from_value(envelope.data.clone()).map_err(|e| {
        AppError::BadRequest(format!("Invalid {} payload: {e}", envelope.event_type))
    })
}

/// Deserialize `data.object` of a payment event.
fn data_object<T: DeserializeOwned>(envelope: &WebhookEnvelope) -> AppResult<T> {
    let object = envelope.data.get("object").cloned().unwrap_or_default();
    serde_json::from_value(object).map_err(|e| {
        AppError::BadRequest(format!("Invalid {} payload: {e}", envelope.event_type))
    })
}
