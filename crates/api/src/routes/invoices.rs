use axum::routing::{get, post};
use axum::Router;

use crate::handlers::invoices;
use crate::state::AppState;

/// Invoice routes mounted at `/invoices`.
///
/// ```text
/// GET    /                      -> list_invoices
/// POST   /                      -> create_invoice
/// GET    /{id}                  -> get_invoice
/// POST   /{id}/send             -> send_invoice
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(invoices::list_invoices).post(invoices::create_invoice))
        .route("/{id}", get(invoices::get_invoice))
        .route("/{id}/send", post(invoices::send_invoice))
}
