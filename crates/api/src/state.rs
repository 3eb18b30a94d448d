use std::sync::Arc;

use photopro_notifications::email::EmailDelivery;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: photopro_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// SMTP delivery, or `None` when `SMTP_HOST` is not configured.
    pub mailer: Option<Arc<EmailDelivery>>,
}
