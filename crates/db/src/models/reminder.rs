//! Sent booking reminders (one row per booking and reminder type).

use photopro_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `booking_reminders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BookingReminder {
    pub id: DbId,
    pub booking_id: DbId,
    pub reminder_type: String,
    pub recipient: Option<String>,
    pub sent_at: Timestamp,
}
