//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches, where the
//!   entity is editable through the API

pub mod booking;
pub mod calendar_feed;
pub mod client;
pub mod invoice;
pub mod organization;
pub mod payment;
pub mod reminder;
pub mod user;
pub mod webhook_event;
