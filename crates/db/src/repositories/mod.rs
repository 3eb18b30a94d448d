//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument. Tenant-scoped lookups take
//! the caller's `organization_id` and never return rows from another tenant.

pub mod booking_repo;
pub mod calendar_feed_repo;
pub mod client_repo;
pub mod invoice_repo;
pub mod organization_repo;
pub mod payment_repo;
pub mod reminder_repo;
pub mod user_repo;
pub mod webhook_event_repo;

pub use booking_repo::BookingRepo;
pub use calendar_feed_repo::CalendarFeedRepo;
pub use client_repo::ClientRepo;
pub use invoice_repo::InvoiceRepo;
pub use organization_repo::OrganizationRepo;
pub use payment_repo::PaymentRepo;
pub use reminder_repo::BookingReminderRepo;
pub use user_repo::UserRepo;
pub use webhook_event_repo::WebhookEventRepo;
