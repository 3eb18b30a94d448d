//! Booking reminder kinds and their due windows.
//!
//! Reminder jobs run on a short interval and may overlap; whether a given
//! booking gets a reminder is decided purely from `now` and the booking
//! start time, and the one-per-kind guarantee is enforced by the
//! `booking_reminders` unique key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::booking::BookingStatus;
use crate::error::CoreError;
use crate::types::Timestamp;

/// Which reminder is being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// Sent once the booking is within 24 hours (but more than an hour away).
    DayBefore,
    /// Sent once the booking is within one hour.
    HourBefore,
}

impl ReminderKind {
    pub const ALL: [ReminderKind; 2] = [ReminderKind::DayBefore, ReminderKind::HourBefore];

    pub fn as_str(self) -> &'static str {
        match self {
            ReminderKind::DayBefore => "day_before",
            ReminderKind::HourBefore => "hour_before",
        }
    }

    /// Exclusive-inclusive `(after, until]` bounds on start time for which
    /// this reminder is due at `now`.
    pub fn due_window(self, now: Timestamp) -> (Timestamp, Timestamp) {
        let hour = chrono::Duration::hours(1);
        match self {
            ReminderKind::DayBefore => (now + hour, now + chrono::Duration::hours(24)),
            ReminderKind::HourBefore => (now, now + hour),
        }
    }

    /// Email subject line for this reminder.
    pub fn subject(self, title: &str) -> String {
        match self {
            ReminderKind::DayBefore => format!("Reminder: {title} is tomorrow"),
            ReminderKind::HourBefore => format!("Reminder: {title} starts in one hour"),
        }
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReminderKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown reminder type '{s}'")))
    }
}

/// Whether a booking with `status` starting at `start` is due for `kind`.
pub fn is_due(kind: ReminderKind, status: BookingStatus, start: Timestamp, now: Timestamp) -> bool {
    if !status.is_remindable() {
        return false;
    }
    let (after, until) = kind.due_window(now);
    start > after && start <= until
}

/// Plain-text reminder body sent to the client.
pub fn reminder_body(
    kind: ReminderKind,
    client_name: &str,
    title: &str,
    start: Timestamp,
    location: Option<&str>,
) -> String {
    let when = start.format("%A, %B %-d at %H:%M UTC");
    let lead = match kind {
        ReminderKind::DayBefore => "This is a reminder of your upcoming session",
        ReminderKind::HourBefore => "Your session starts in about an hour",
    };
    let mut body = format!("Hi {client_name},\n\n{lead}: {title}\nWhen: {when}\n");
    if let Some(location) = location.filter(|l| !l.trim().is_empty()) {
        body.push_str(&format!("Where: {location}\n"));
    }
    body.push_str("\nSee you soon!\n");
    body
}
