//! Processed vendor webhook deliveries (dedupe log).

use photopro_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Provider name for the payments vendor.
pub const PROVIDER_PAYMENTS: &str = "payments";
/// Provider name for the identity vendor.
pub const PROVIDER_IDENTITY: &str = "identity";

/// A row from the `webhook_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WebhookEvent {
    pub id: DbId,
    pub provider: String,
    pub external_event_id: String,
    pub event_type: String,
    pub received_at: Timestamp,
}
