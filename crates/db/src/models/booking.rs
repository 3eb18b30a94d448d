//! Bookings (scheduled sessions) and the joined projections used by the
//! calendar feed and reminder jobs.

use photopro_core::booking::BookingStatus;
use photopro_core::error::CoreError;
use photopro_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `bookings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: DbId,
    pub organization_id: DbId,
    pub client_id: Option<DbId>,
    pub assigned_user_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Booking {
    /// Parse the stored status string.
    pub fn status(&self) -> Result<BookingStatus, CoreError> {
        self.status.parse()
    }
}

/// A booking joined with its client's contact details.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BookingWithClient {
    pub id: DbId,
    pub organization_id: DbId,
    pub assigned_user_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
}

impl BookingWithClient {
    /// Parse the stored status string.
    pub fn status(&self) -> Result<BookingStatus, CoreError> {
        self.status.parse()
    }
}

/// DTO for creating a booking.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBooking {
    pub client_id: Option<DbId>,
    pub assigned_user_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub status: Option<BookingStatus>,
}

/// DTO for updating a booking. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBooking {
    pub client_id: Option<DbId>,
    pub assigned_user_id: Option<DbId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
}

/// DTO for a status change.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBookingStatus {
    pub status: BookingStatus,
}

/// Filters for listing bookings.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub status: Option<BookingStatus>,
    pub assigned_user_id: Option<DbId>,
    pub limit: i64,
    pub offset: i64,
}
