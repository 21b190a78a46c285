//! Route definitions for the `/products` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{products, reviews};
use crate::state::AppState;

/// Routes mounted at `/products`.
///
/// ```text
/// GET  /               -> list (optional ?category_id=)
/// GET  /{id}           -> get
/// GET  /{id}/reviews   -> list reviews
/// POST /{id}/reviews   -> create review (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list))
        .route("/{id}", get(products::get))
        .route("/{id}/reviews", get(reviews::list).post(reviews::create))
}
