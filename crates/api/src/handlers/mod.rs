pub mod bookings;
pub mod calendar_feed;
pub mod clients;
pub mod cron;
pub mod invoices;
pub mod webhooks;
