//! In-memory cart storage.
//!
//! Carts live for the lifetime of the server process, keyed by user id.
//! The [`CartStore`] trait seam means handlers and the checkout pipeline
//! never see this concrete type; a database-backed store can replace it
//! without touching either.

use std::collections::HashMap;

use async_trait::async_trait;
use atelier_core::cart::{CartLine, CartStore};
use atelier_core::types::DbId;
use tokio::sync::Mutex;

/// Process-local cart store keyed by user id.
#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    carts: Mutex<HashMap<DbId, Vec<CartLine>>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn get_cart(&self, user_id: DbId) -> Vec<CartLine> {
        self.carts
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn set_cart(&self, user_id: DbId, lines: Vec<CartLine>) {
        let mut carts = self.carts.lock().await;
        if lines.is_empty() {
            carts.remove(&user_id);
        } else {
            carts.insert(user_id, lines);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: DbId, quantity: i64) -> CartLine {
        CartLine {
            product_id,
            name: format!("Product {product_id}"),
            price: 10.0,
            quantity,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_empty_cart_for_unknown_user() {
        let store = InMemoryCartStore::new();
        assert!(store.get_cart(42).await.is_empty());
    }

    #[tokio::test]
    async fn test_set_and_get_cart() {
        let store = InMemoryCartStore::new();
        store.set_cart(1, vec![line(10, 2), line(11, 1)]).await;

        let cart = store.get_cart(1).await;
        assert_eq!(cart.len(), 2);
        assert_eq!(cart[0].product_id, 10);
        assert_eq!(cart[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_carts_are_per_user() {
        let store = InMemoryCartStore::new();
        store.set_cart(1, vec![line(10, 1)]).await;
        store.set_cart(2, vec![line(20, 3)]).await;

        assert_eq!(store.get_cart(1).await[0].product_id, 10);
        assert_eq!(store.get_cart(2).await[0].product_id, 20);
    }

    #[tokio::test]
    async fn test_setting_empty_clears_cart() {
        let store = InMemoryCartStore::new();
        store.set_cart(1, vec![line(10, 1)]).await;
        store.set_cart(1, Vec::new()).await;
        assert!(store.get_cart(1).await.is_empty());
    }
}
