//! Repository for the `users` table.

use photopro_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{UpsertUser, User};

const COLUMNS: &str = "\
    id, external_id, organization_id, email, full_name, role, created_at, updated_at";

/// Provides queries for organization members.
pub struct UserRepo;

impl UserRepo {
    /// Insert a user, or refresh their profile if the vendor id exists.
    pub async fn upsert(pool: &PgPool, input: &UpsertUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (external_id, organization_id, email, full_name, role) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT ON CONSTRAINT uq_users_external_id DO UPDATE SET \
                 organization_id = EXCLUDED.organization_id, \
                 email = EXCLUDED.email, \
                 full_name = EXCLUDED.full_name, \
                 role = EXCLUDED.role \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.external_id)
            .bind(input.organization_id)
            .bind(&input.email)
            .bind(&input.full_name)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a user by identity vendor id.
    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE external_id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user within an organization.
    pub async fn find_in_org(
        pool: &PgPool,
        organization_id: DbId,
        id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND organization_id = $2");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a user by vendor id. Their personal feeds are removed by cascade.
    pub async fn delete_by_external_id(pool: &PgPool, external_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE external_id = $1")
            .bind(external_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
