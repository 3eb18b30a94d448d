//! Booking lifecycle status and scheduling validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ical::EventStatus;
use crate::types::Timestamp;

/// Maximum length of a booking duration (one week).
pub const MAX_BOOKING_DURATION_HOURS: i64 = 24 * 7;

/// Booking status as stored in `bookings.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
        BookingStatus::NoShow,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::NoShow => "no_show",
        }
    }

    /// Calendar `STATUS` for this booking.
    pub fn ical_status(self) -> EventStatus {
        match self {
            BookingStatus::Confirmed | BookingStatus::Completed => EventStatus::Confirmed,
            BookingStatus::Pending => EventStatus::Tentative,
            BookingStatus::Cancelled | BookingStatus::NoShow => EventStatus::Cancelled,
        }
    }

    /// Whether a client should still receive reminders for this booking.
    pub fn is_remindable(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown booking status '{s}'")))
    }
}

/// Validate that a booking ends after it starts and is not absurdly long.
pub fn validate_time_range(start: Timestamp, end: Timestamp) -> Result<(), CoreError> {
    if end <= start {
        return Err(CoreError::Validation(
            "end_time must be after start_time".into(),
        ));
    }
    if end - start > chrono::Duration::hours(MAX_BOOKING_DURATION_HOURS) {
        return Err(CoreError::Validation(format!(
            "Booking may not last longer than {MAX_BOOKING_DURATION_HOURS} hours"
        )));
    }
    Ok(())
}

/// Validate a booking title (non-empty, at most 200 characters).
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("title must not be empty".into()));
    }
    if trimmed.chars().count() > 200 {
        return Err(CoreError::Validation(
            "title must be at most 200 characters".into(),
        ));
    }
    Ok(())
}
