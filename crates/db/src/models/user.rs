//! Studio members, provisioned from identity vendor webhooks.

use photopro_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Role of the organization owner.
pub const ROLE_OWNER: &str = "owner";
/// Role of an organization administrator.
pub const ROLE_ADMIN: &str = "admin";
/// Role of a regular member.
pub const ROLE_MEMBER: &str = "member";

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub external_id: String,
    pub organization_id: DbId,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating or refreshing a user by its vendor id.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertUser {
    pub external_id: String,
    pub organization_id: DbId,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
}
