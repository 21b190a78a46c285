//! Order and order item models.

use atelier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Order row from the `orders` table. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: DbId,
    pub user_id: DbId,
    pub total_amount: f64,
    pub payment_status: String,
    pub payment_method: String,
    pub status: String,
    pub created_at: Timestamp,
}

/// Order item row; `price` is the store-verified price at checkout time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderItem {
    pub id: DbId,
    pub order_id: DbId,
    pub product_id: DbId,
    pub product_name: String,
    pub quantity: i32,
    pub price: f64,
}
