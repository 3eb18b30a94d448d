//! Background loop that runs the notification jobs on a fixed interval.
//!
//! The cron endpoints run the same passes on demand; overlapping runs are
//! harmless because both jobs claim their work in the database.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use photopro_db::DbPool;
use tokio_util::sync::CancellationToken;

use crate::email::EmailDelivery;
use crate::jobs;

/// Default time between passes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(900);

/// Periodically sends due booking reminders and overdue-invoice notices.
pub struct ReminderScheduler {
    pool: DbPool,
    mailer: Option<Arc<EmailDelivery>>,
    interval: Duration,
}

impl ReminderScheduler {
    pub fn new(pool: DbPool, mailer: Option<Arc<EmailDelivery>>, interval: Duration) -> Self {
        Self {
            pool,
            mailer,
            interval,
        }
    }

    /// Run until `cancel` fires. The first pass runs immediately.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            email_enabled = self.mailer.is_some(),
            "Reminder scheduler started"
        );

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Reminder scheduler stopping");
                    break;
                }
                _ = interval.tick() => {
                    self.run_once().await;
                }
            }
        }
    }

    /// One pass of each job. Failures are logged and retried next tick.
    async fn run_once(&self) {
        let now = Utc::now();
        let mailer = self.mailer.as_deref();

        if let Err(e) = jobs::send_booking_reminders(&self.pool, mailer, now).await {
            tracing::error!(error = %e, "Booking reminder pass failed");
        }
        if let Err(e) = jobs::mark_overdue_invoices(&self.pool, mailer, now).await {
            tracing::error!(error = %e, "Overdue invoice pass failed");
        }
    }
}
