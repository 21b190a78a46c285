pub mod auth;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                   register (public)
/// /auth/login                      login (public)
/// /auth/logout                     logout (requires auth)
/// /auth/me                         current user (requires auth)
///
/// /products                        list catalog (public)
/// /products/{id}                   product detail (public)
/// /products/{id}/reviews           list, create reviews
///
/// /cart                            get, clear (requires auth)
/// /cart/items                      add item (requires auth)
/// /cart/items/{product_id}         remove item (requires auth)
///
/// /checkout                        place order (requires auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .nest("/cart", cart::router())
        .nest("/checkout", checkout::router())
}
