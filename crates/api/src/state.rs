use std::sync::Arc;

use atelier_core::cart::CartStore;

use crate::auth::session::SessionManager;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: atelier_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Active login sessions (opaque bearer tokens).
    pub sessions: Arc<SessionManager>,
    /// Per-user session carts. Behind the trait seam so a persistent cart
    /// store can substitute without touching handlers or checkout.
    pub carts: Arc<dyn CartStore>,
}
