//! Route definition for checkout. Requires auth.

use axum::routing::post;
use axum::Router;

use crate::handlers::checkout;
use crate::state::AppState;

/// Routes mounted at `/checkout`.
///
/// ```text
/// POST / -> checkout
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(checkout::checkout))
}
