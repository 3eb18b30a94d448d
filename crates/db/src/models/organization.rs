//! Tenant organizations, provisioned from identity vendor webhooks.

use photopro_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `organizations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Organization {
    pub id: DbId,
    pub external_id: String,
    pub name: String,
    pub slug: String,
    pub timezone: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating or refreshing an organization by its vendor id.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertOrganization {
    pub external_id: String,
    pub name: String,
    pub slug: String,
    pub timezone: Option<String>,
}
