//! Repository for orders, order items, and shipping addresses.

use atelier_core::checkout::OrderDraft;
use atelier_core::types::DbId;
use sqlx::PgPool;

/// Provides the transactional checkout commit.
pub struct OrderRepo;

impl OrderRepo {
    /// Insert the order, its items, and the shipping address in one
    /// transaction. A failure in any statement rolls back every write.
    ///
    /// Returns the new order's id.
    pub async fn create_with_items(pool: &PgPool, draft: &OrderDraft) -> Result<DbId, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (order_id,): (DbId,) = sqlx::query_as(
            "INSERT INTO orders (user_id, total_amount, payment_status, payment_method, status)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(draft.user_id)
        .bind(draft.total_amount)
        .bind(draft.payment_status)
        .bind(&draft.payment_method)
        .bind(draft.status)
        .fetch_one(&mut *tx)
        .await?;

        for line in &draft.lines {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, product_name, quantity, price)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(&line.name)
            .bind(line.quantity as i32)
            .bind(line.price)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "INSERT INTO user_addresses
                 (user_id, address_line1, address_line2, city, state, postal_code, country)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(draft.user_id)
        .bind(&draft.address.address_line1)
        .bind(&draft.address.address_line2)
        .bind(&draft.address.city)
        .bind(&draft.address.state)
        .bind(&draft.address.postal_code)
        .bind(&draft.address.country)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(order_id)
    }
}
