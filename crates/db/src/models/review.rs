//! Review models.

use atelier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Review row from the `reviews` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    pub user_id: DbId,
    pub product_id: DbId,
    pub rating: i32,
    pub comment: String,
    pub created_at: Timestamp,
}

/// Review joined with the reviewer's name, as listed per product.
///
/// `comment` and `user_name` are raw database values; the handler escapes
/// them for HTML output.
#[derive(Debug, Clone, FromRow)]
pub struct ReviewWithAuthor {
    pub id: DbId,
    pub rating: i32,
    pub comment: String,
    pub user_name: String,
    pub created_at: Timestamp,
}

/// DTO for creating a review. The comment is stored as submitted (trimmed);
/// escaping happens at the output boundary.
#[derive(Debug, Clone)]
pub struct CreateReview {
    pub user_id: DbId,
    pub product_id: DbId,
    pub rating: i32,
    pub comment: String,
}
