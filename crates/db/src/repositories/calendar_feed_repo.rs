//! Repository for the `calendar_feeds` table.

use photopro_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::calendar_feed::CalendarFeed;

const COLUMNS: &str = "\
    id, organization_id, user_id, token, name, timezone, is_active, \
    last_accessed_at, created_at, updated_at";

/// Provides queries for calendar subscription feeds.
pub struct CalendarFeedRepo;

impl CalendarFeedRepo {
    /// Insert a new active feed.
    pub async fn create(
        pool: &PgPool,
        organization_id: DbId,
        user_id: Option<DbId>,
        token: &str,
        name: &str,
        timezone: &str,
    ) -> Result<CalendarFeed, sqlx::Error> {
        let query = format!(
            "INSERT INTO calendar_feeds (organization_id, user_id, token, name, timezone) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CalendarFeed>(&query)
            .bind(organization_id)
            .bind(user_id)
            .bind(token)
            .bind(name)
            .bind(timezone)
            .fetch_one(pool)
            .await
    }

    /// List an organization's feeds, newest first.
    pub async fn list_for_org(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Vec<CalendarFeed>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM calendar_feeds WHERE organization_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, CalendarFeed>(&query)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }

    /// Find a feed by id within an organization.
    pub async fn find(
        pool: &PgPool,
        organization_id: DbId,
        id: DbId,
    ) -> Result<Option<CalendarFeed>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM calendar_feeds WHERE id = $1 AND organization_id = $2"
        );
        sqlx::query_as::<_, CalendarFeed>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve an active feed by token and record the access in one statement.
    ///
    /// Returns `None` for unknown or inactive tokens, in which case nothing is
    /// written.
    pub async fn access_by_token(
        pool: &PgPool,
        token: &str,
        accessed_at: Timestamp,
    ) -> Result<Option<CalendarFeed>, sqlx::Error> {
        let query = format!(
            "UPDATE calendar_feeds SET last_accessed_at = $2 \
             WHERE token = $1 AND is_active = TRUE \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CalendarFeed>(&query)
            .bind(token)
            .bind(accessed_at)
            .fetch_optional(pool)
            .await
    }

    /// Replace a feed's token, invalidating the old subscription URL.
    pub async fn regenerate_token(
        pool: &PgPool,
        organization_id: DbId,
        id: DbId,
        token: &str,
    ) -> Result<Option<CalendarFeed>, sqlx::Error> {
        let query = format!(
            "UPDATE calendar_feeds SET token = $3, is_active = TRUE \
             WHERE id = $1 AND organization_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CalendarFeed>(&query)
            .bind(id)
            .bind(organization_id)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Deactivate a feed. Its token stops resolving but the row is kept.
    pub async fn deactivate(
        pool: &PgPool,
        organization_id: DbId,
        id: DbId,
    ) -> Result<Option<CalendarFeed>, sqlx::Error> {
        let query = format!(
            "UPDATE calendar_feeds SET is_active = FALSE \
             WHERE id = $1 AND organization_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CalendarFeed>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a feed permanently.
    pub async fn delete(pool: &PgPool, organization_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM calendar_feeds WHERE id = $1 AND organization_id = $2")
                .bind(id)
                .bind(organization_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
