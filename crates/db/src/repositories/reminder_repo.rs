//! Repository for the `booking_reminders` table.

use photopro_core::reminders::ReminderKind;
use photopro_core::types::DbId;
use sqlx::PgPool;

use crate::models::reminder::BookingReminder;

const COLUMNS: &str = "id, booking_id, reminder_type, recipient, sent_at";

/// Provides the idempotency ledger for booking reminders.
pub struct BookingReminderRepo;

impl BookingReminderRepo {
    /// Claim the right to send `kind` for a booking.
    ///
    /// Returns `true` if this call inserted the ledger row, `false` if some
    /// earlier (or concurrent) run already claimed it.
    pub async fn claim(
        pool: &PgPool,
        booking_id: DbId,
        kind: ReminderKind,
        recipient: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO booking_reminders (booking_id, reminder_type, recipient) \
             VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_booking_reminders_booking_type DO NOTHING",
        )
        .bind(booking_id)
        .bind(kind.as_str())
        .bind(recipient)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List reminders already sent for a booking.
    pub async fn list_for_booking(
        pool: &PgPool,
        booking_id: DbId,
    ) -> Result<Vec<BookingReminder>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM booking_reminders WHERE booking_id = $1 ORDER BY sent_at ASC"
        );
        sqlx::query_as::<_, BookingReminder>(&query)
            .bind(booking_id)
            .fetch_all(pool)
            .await
    }
}
