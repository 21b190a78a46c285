//! Route definitions for the `/cart` resource. All routes require auth.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::cart;
use crate::state::AppState;

/// Routes mounted at `/cart`.
///
/// ```text
/// GET    /                     -> get
/// DELETE /                     -> clear
/// POST   /items                -> add_item
/// DELETE /items/{product_id}   -> remove_item
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::get).delete(cart::clear))
        .route("/items", post(cart::add_item))
        .route("/items/{product_id}", delete(cart::remove_item))
}
