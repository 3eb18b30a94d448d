//! Repository for the `organizations` table.

use photopro_core::calendar_feed::DEFAULT_FEED_TIMEZONE;
use photopro_core::types::DbId;
use sqlx::PgPool;

use crate::models::organization::{Organization, UpsertOrganization};

const COLUMNS: &str = "id, external_id, name, slug, timezone, created_at, updated_at";

/// Provides queries for tenant organizations.
pub struct OrganizationRepo;

impl OrganizationRepo {
    /// Insert an organization, or refresh name/slug/timezone if the vendor
    /// id already exists.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertOrganization,
    ) -> Result<Organization, sqlx::Error> {
        let query = format!(
            "INSERT INTO organizations (external_id, name, slug, timezone) \
             VALUES ($1, $2, $3, COALESCE($4, $5)) \
             ON CONFLICT ON CONSTRAINT uq_organizations_external_id DO UPDATE SET \
                 name = EXCLUDED.name, \
                 slug = EXCLUDED.slug, \
                 timezone = COALESCE($4, organizations.timezone) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Organization>(&query)
            .bind(&input.external_id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.timezone)
            .bind(DEFAULT_FEED_TIMEZONE)
            .fetch_one(pool)
            .await
    }

    /// Find an organization by identity vendor id.
    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<Organization>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM organizations WHERE external_id = $1");
        sqlx::query_as::<_, Organization>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete an organization by vendor id. Cascades to all tenant data.
    pub async fn delete_by_external_id(pool: &PgPool, external_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM organizations WHERE external_id = $1")
            .bind(external_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
