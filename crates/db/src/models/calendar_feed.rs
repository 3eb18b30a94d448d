//! Calendar subscription feeds.

use photopro_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `calendar_feeds` table.
///
/// `user_id = None` means the feed covers every booking in the organization;
/// otherwise only bookings assigned to that user are included.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CalendarFeed {
    pub id: DbId,
    pub organization_id: DbId,
    pub user_id: Option<DbId>,
    #[serde(skip_serializing)]
    pub token: String,
    pub name: String,
    pub timezone: String,
    pub is_active: bool,
    pub last_accessed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCalendarFeed {
    pub name: Option<String>,
    pub timezone: Option<String>,
    /// Limit the feed to bookings assigned to the creating user.
    #[serde(default)]
    pub personal: bool,
}
