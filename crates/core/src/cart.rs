//! Session cart model.
//!
//! Cart lines are client-advisory: product identity and quantity are used
//! by checkout, but name/price/image are display hints that the checkout
//! pipeline re-derives from the trusted product store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// One line of a user's session cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: DbId,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub image_url: Option<String>,
}

/// Server-side per-user cart storage.
///
/// Reads and writes are last-write-wins; concurrent mutation from the same
/// session is not reconciled. The trait seam exists so a
/// stronger-consistency store can replace the in-memory one without
/// touching checkout.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn get_cart(&self, user_id: DbId) -> Vec<CartLine>;
    async fn set_cart(&self, user_id: DbId, lines: Vec<CartLine>);
}

/// Add a line to the cart, merging quantities when the product is already
/// present.
pub fn add_line(cart: &mut Vec<CartLine>, line: CartLine) {
    if let Some(existing) = cart.iter_mut().find(|l| l.product_id == line.product_id) {
        existing.quantity += line.quantity;
    } else {
        cart.push(line);
    }
}

/// Remove a product's line from the cart. Returns `false` if it was not
/// present.
pub fn remove_line(cart: &mut Vec<CartLine>, product_id: DbId) -> bool {
    let before = cart.len();
    cart.retain(|l| l.product_id != product_id);
    cart.len() < before
}
