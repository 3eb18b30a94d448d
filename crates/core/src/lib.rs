//! Domain logic shared by the PhotoProOS backend crates.
//!
//! Everything here is pure (no database, no network) so it can be unit
//! tested directly and reused by the API server and the job runner.

pub mod booking;
pub mod calendar_feed;
pub mod error;
pub mod ical;
pub mod invoice;
pub mod reminders;
pub mod search;
pub mod types;
pub mod webhook_signature;
