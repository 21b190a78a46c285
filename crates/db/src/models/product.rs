//! Product catalog models.

use atelier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Product row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category_id: DbId,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
}

/// Product joined with its category name, as listed by the catalog
/// endpoint.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductWithCategory {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category_id: DbId,
    pub category: String,
    pub image_url: Option<String>,
}
