//! Repository for the `products` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::product::{Product, ProductWithCategory};

const COLUMNS: &str = "id, name, description, price, category_id, image_url, created_at";

const JOINED_COLUMNS: &str = "p.id, p.name, p.description, p.price, p.category_id, \
                               c.name AS category, p.image_url";

/// Provides read operations for the product catalog.
pub struct ProductRepo;

impl ProductRepo {
    /// List all products with their category names.
    pub async fn list(pool: &PgPool) -> Result<Vec<ProductWithCategory>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM products p
             JOIN categories c ON p.category_id = c.id
             ORDER BY p.id"
        );
        sqlx::query_as::<_, ProductWithCategory>(&query)
            .fetch_all(pool)
            .await
    }

    /// List products in one category, with category names.
    pub async fn list_by_category(
        pool: &PgPool,
        category_id: DbId,
    ) -> Result<Vec<ProductWithCategory>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM products p
             JOIN categories c ON p.category_id = c.id
             WHERE p.category_id = $1
             ORDER BY p.id"
        );
        sqlx::query_as::<_, ProductWithCategory>(&query)
            .bind(category_id)
            .fetch_all(pool)
            .await
    }

    /// Find a product by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
