//! Repository for the `webhook_events` table.

use sqlx::PgPool;

use crate::models::webhook_event::WebhookEvent;

const COLUMNS: &str = "id, provider, external_event_id, event_type, received_at";

/// Provides the per-delivery dedupe log for vendor webhooks.
pub struct WebhookEventRepo;

impl WebhookEventRepo {
    /// Record a delivery. Returns `false` if this event id was seen before.
    pub async fn record_once(
        pool: &PgPool,
        provider: &str,
        external_event_id: &str,
        event_type: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO webhook_events (provider, external_event_id, event_type) \
             VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_webhook_events_provider_event DO NOTHING",
        )
        .bind(provider)
        .bind(external_event_id)
        .bind(event_type)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Forget a delivery so the vendor's retry is processed again.
    ///
    /// Called when handling failed after the event was recorded.
    pub async fn forget(
        pool: &PgPool,
        provider: &str,
        external_event_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM webhook_events WHERE provider = $1 AND external_event_id = $2")
            .bind(provider)
            .bind(external_event_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Most recent deliveries for a provider.
    pub async fn list_recent(
        pool: &PgPool,
        provider: &str,
        limit: i64,
    ) -> Result<Vec<WebhookEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM webhook_events WHERE provider = $1 \
             ORDER BY received_at DESC, id DESC LIMIT $2"
        );
        sqlx::query_as::<_, WebhookEvent>(&query)
            .bind(provider)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
