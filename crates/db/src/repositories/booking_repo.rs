//! Repository for the `bookings` table.

use photopro_core::booking::BookingStatus;
use photopro_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::booking::{Booking, BookingFilter, BookingWithClient, CreateBooking, UpdateBooking};

const COLUMNS: &str = "\
    id, organization_id, client_id, assigned_user_id, title, description, location, \
    start_time, end_time, status, created_at, updated_at";

/// Booking columns qualified with `b.` plus the joined client contact fields.
const WITH_CLIENT_COLUMNS: &str = "\
    b.id, b.organization_id, b.assigned_user_id, b.title, b.description, b.location, \
    b.start_time, b.end_time, b.status, b.created_at, b.updated_at, \
    c.full_name AS client_name, c.email AS client_email, c.phone AS client_phone";

/// Provides tenant-scoped CRUD operations for bookings plus the window
/// queries used by calendar feeds and reminder jobs.
pub struct BookingRepo;

impl BookingRepo {
    /// Insert a new booking, returning the created row.
    ///
    /// Status defaults to `pending` when not provided.
    pub async fn create(
        pool: &PgPool,
        organization_id: DbId,
        input: &CreateBooking,
    ) -> Result<Booking, sqlx::Error> {
        let query = format!(
            "INSERT INTO bookings \
                 (organization_id, client_id, assigned_user_id, title, description, location, \
                  start_time, end_time, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        let status = input.status.unwrap_or(BookingStatus::Pending);
        sqlx::query_as::<_, Booking>(&query)
            .bind(organization_id)
            .bind(input.client_id)
            .bind(input.assigned_user_id)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(&input.location)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(status.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a booking by id within an organization.
    pub async fn find(
        pool: &PgPool,
        organization_id: DbId,
        id: DbId,
    ) -> Result<Option<Booking>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM bookings WHERE id = $1 AND organization_id = $2");
        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// List bookings ordered by start time, applying the optional filters.
    pub async fn list(
        pool: &PgPool,
        organization_id: DbId,
        filter: &BookingFilter,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bookings \
             WHERE organization_id = $1 \
               AND ($2::timestamptz IS NULL OR start_time >= $2) \
               AND ($3::timestamptz IS NULL OR start_time <= $3) \
               AND ($4::text IS NULL OR status = $4) \
               AND ($5::bigint IS NULL OR assigned_user_id = $5) \
             ORDER BY start_time ASC, id ASC \
             LIMIT $6 OFFSET $7"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(organization_id)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.status.map(BookingStatus::as_str))
            .bind(filter.assigned_user_id)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// Update a booking. Returns `None` if no row matched.
    ///
    /// The caller is responsible for validating the merged time range; the
    /// `ck_bookings_time_range` constraint is the last line of defence.
    pub async fn update(
        pool: &PgPool,
        organization_id: DbId,
        id: DbId,
        input: &UpdateBooking,
    ) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!(
            "UPDATE bookings SET \
                 client_id = COALESCE($3, client_id), \
                 assigned_user_id = COALESCE($4, assigned_user_id), \
                 title = COALESCE($5, title), \
                 description = COALESCE($6, description), \
                 location = COALESCE($7, location), \
                 start_time = COALESCE($8, start_time), \
                 end_time = COALESCE($9, end_time) \
             WHERE id = $1 AND organization_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .bind(organization_id)
            .bind(input.client_id)
            .bind(input.assigned_user_id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(&input.location)
            .bind(input.start_time)
            .bind(input.end_time)
            .fetch_optional(pool)
            .await
    }

    /// Change a booking's status. Returns `None` if no row matched.
    pub async fn set_status(
        pool: &PgPool,
        organization_id: DbId,
        id: DbId,
        status: BookingStatus,
    ) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!(
            "UPDATE bookings SET status = $3 \
             WHERE id = $1 AND organization_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .bind(organization_id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Delete a booking. Its reminder rows are removed by cascade.
    pub async fn delete(pool: &PgPool, organization_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1 AND organization_id = $2")
            .bind(id)
            .bind(organization_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Bookings to publish in a calendar feed.
    ///
    /// Includes every booking of the organization (or only those assigned to
    /// `user_id` when given) starting within `[from, to]`. Cancelled bookings
    /// are excluded here rather than emitted with a cancelled status.
    pub async fn list_for_feed(
        pool: &PgPool,
        organization_id: DbId,
        user_id: Option<DbId>,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<BookingWithClient>, sqlx::Error> {
        let query = format!(
            "SELECT {WITH_CLIENT_COLUMNS} \
             FROM bookings b \
             LEFT JOIN clients c ON c.id = b.client_id \
             WHERE b.organization_id = $1 \
               AND ($2::bigint IS NULL OR b.assigned_user_id = $2) \
               AND b.start_time >= $3 \
               AND b.start_time <= $4 \
               AND b.status <> 'cancelled' \
             ORDER BY b.start_time ASC, b.id ASC"
        );
        sqlx::query_as::<_, BookingWithClient>(&query)
            .bind(organization_id)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    /// Open bookings starting in `(after, until]` that have not yet received
    /// the `reminder_type` reminder, across all organizations.
    pub async fn list_due_for_reminder(
        pool: &PgPool,
        reminder_type: &str,
        after: Timestamp,
        until: Timestamp,
        limit: i64,
    ) -> Result<Vec<BookingWithClient>, sqlx::Error> {
        let query = format!(
            "SELECT {WITH_CLIENT_COLUMNS} \
             FROM bookings b \
             LEFT JOIN clients c ON c.id = b.client_id \
             WHERE b.status IN ('pending', 'confirmed') \
               AND b.start_time > $2 \
               AND b.start_time <= $3 \
               AND NOT EXISTS ( \
                   SELECT 1 FROM booking_reminders r \
                   WHERE r.booking_id = b.id AND r.reminder_type = $1 \
               ) \
             ORDER BY b.start_time ASC \
             LIMIT $4"
        );
        sqlx::query_as::<_, BookingWithClient>(&query)
            .bind(reminder_type)
            .bind(after)
            .bind(until)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
