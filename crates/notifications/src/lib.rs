//! Outbound client notifications and the periodic jobs that produce them.
//!
//! - [`email`] -- SMTP delivery via `lettre`.
//! - [`jobs`] -- one pass of the booking-reminder and overdue-invoice jobs.
//! - [`scheduler`] -- background loop running both jobs on an interval.

pub mod email;
pub mod jobs;
pub mod scheduler;
