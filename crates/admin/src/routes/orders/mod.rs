//! Orders management route handlers.
//!
//! Listing, detail, and the single-order actions. Status transitions happen
//! in the commerce API; the console only triggers `process` and `cancel`.

mod actions;
mod detail;
mod list;
pub mod types;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub use actions::{CancelFormInput, NoteFormInput, ShippingInfoForm};
pub use detail::{OrderShowTemplate, show};
pub use list::{OrdersIndexTemplate, index};
pub use types::{OrderDetailView, OrderRow, OrdersQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(index))
        .route("/orders/{id}", get(show))
        .route("/orders/{id}/process", post(actions::process))
        .route("/orders/{id}/cancel", post(actions::cancel))
        .route("/orders/{id}/delete", post(actions::delete))
        .route("/orders/{id}/note", post(actions::update_note))
        .route(
            "/orders/{id}/shipping-info",
            post(actions::update_shipping_info),
        )
}
