//! Checkout integrity pipeline.
//!
//! Consumes the server-side cart plus the client-submitted address and
//! payment method, re-validates the address through the rule engine,
//! re-derives every line price from the trusted product store, and commits
//! the order through a single transactional [`OrderStore`] call. Client
//! prices are never trusted; they exist only for cart display.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::cart::CartLine;
use crate::error::CoreError;
use crate::types::DbId;
use crate::validation::{FieldValue, Validator};

/// Accepted payment methods. Payment is recorded, not processed.
pub const VALID_PAYMENT_METHODS: &[&str] = &["card", "paypal", "bank_transfer", "other"];

/// Maximum quantity per order line.
pub const MAX_LINE_QUANTITY: i64 = 100;

/// Ceiling on the computed order total. Guards against corrupted
/// accumulation; line prices are already store-verified.
pub const MAX_ORDER_TOTAL: f64 = 1_000_000.0;

/// Trusted product data as read from the store at checkout time.
#[derive(Debug, Clone)]
pub struct ProductInfo {
    pub id: DbId,
    pub name: String,
    pub price: f64,
    pub image_url: Option<String>,
}

/// Authoritative product lookup.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get_product(&self, id: DbId) -> Result<Option<ProductInfo>, CoreError>;
}

/// A cart line after price re-verification. `price` and `name` come from
/// the product store, never from the client.
#[derive(Debug, Clone)]
pub struct VerifiedLine {
    pub product_id: DbId,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub image_url: Option<String>,
}

/// Validated, sanitized shipping address ready for persistence.
#[derive(Debug, Clone, Default)]
pub struct ShippingAddress {
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// Everything the order store must persist atomically: the order row, one
/// item per verified line, and the shipping address.
#[derive(Debug)]
pub struct OrderDraft {
    pub user_id: DbId,
    pub total_amount: f64,
    pub payment_method: String,
    /// Always `"unpaid"`; payment processing is out of scope.
    pub payment_status: &'static str,
    pub status: &'static str,
    pub lines: Vec<VerifiedLine>,
    pub address: ShippingAddress,
}

/// Transactional order persistence. The implementation must write the
/// order, its items, and the address in one transaction: a failure in any
/// write rolls back all of them.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create_order(&self, draft: &OrderDraft) -> Result<DbId, CoreError>;
}

/// Client-submitted checkout payload. Address fields are raw and validated
/// here; the cart itself comes from server-side session state.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub address: BTreeMap<String, String>,
    pub payment_method: String,
}

/// Successful checkout result.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    pub order_id: DbId,
    pub total_amount: f64,
}

/// Checkout failure taxonomy. `Integrity` and `Commit` render a generic
/// message; the internal detail is for logs only.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    /// The validator's first error, surfaced verbatim.
    #[error("{0}")]
    InvalidAddress(String),

    #[error("Invalid payment method")]
    InvalidPaymentMethod,

    /// Missing product, bad quantity, or an out-of-bounds total.
    #[error("Order failed. Please try again.")]
    Integrity { detail: String },

    /// Transactional write failure; everything was rolled back.
    #[error("Order failed. Please try again.")]
    Commit(#[source] CoreError),
}

/// The checkout pipeline over its two trusted-store collaborators.
pub struct CheckoutPipeline<'a> {
    products: &'a dyn ProductStore,
    orders: &'a dyn OrderStore,
}

impl<'a> CheckoutPipeline<'a> {
    pub fn new(products: &'a dyn ProductStore, orders: &'a dyn OrderStore) -> Self {
        Self { products, orders }
    }

    /// Run checkout for an authenticated user. Every step is a hard gate;
    /// on any error no order, item, or address row exists and the caller's
    /// cart must be left unchanged.
    pub async fn checkout(
        &self,
        user_id: DbId,
        cart: &[CartLine],
        request: &CheckoutRequest,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let address = self.validate_address(&request.address).await?;

        if !VALID_PAYMENT_METHODS.contains(&request.payment_method.as_str()) {
            return Err(CheckoutError::InvalidPaymentMethod);
        }

        let (lines, total_amount) = self.verify_lines(cart).await?;

        if total_amount <= 0.0 || total_amount > MAX_ORDER_TOTAL {
            return Err(CheckoutError::Integrity {
                detail: format!("computed order total {total_amount} out of bounds"),
            });
        }

        let draft = OrderDraft {
            user_id,
            total_amount,
            payment_method: request.payment_method.clone(),
            payment_status: "unpaid",
            status: "pending",
            lines,
            address,
        };

        let order_id = self
            .orders
            .create_order(&draft)
            .await
            .map_err(CheckoutError::Commit)?;

        tracing::info!(order_id, user_id, total_amount, "Order created");

        Ok(CheckoutReceipt {
            order_id,
            total_amount,
        })
    }

    /// Validate the raw address fields and produce the sanitized address.
    async fn validate_address(
        &self,
        fields: &BTreeMap<String, String>,
    ) -> Result<ShippingAddress, CheckoutError> {
        let data = fields
            .iter()
            .map(|(k, v)| (k.clone(), FieldValue::from(v.clone())))
            .collect();

        let mut v = Validator::new(data);
        v.validate("address_line1", "Address Line 1", "required|max:255")
            .await
            .validate("address_line2", "Address Line 2", "max:255")
            .await
            .validate("city", "City", "required|alpha|max:100")
            .await
            .validate("state", "State/County", "required|alpha|max:100")
            .await
            .validate("postal_code", "Postal Code", "required|postalcode|max:20")
            .await
            .validate("country", "Country", "required|alpha|max:100")
            .await;

        if v.fails() {
            let message = v.first_error().unwrap_or("Invalid address").to_string();
            return Err(CheckoutError::InvalidAddress(message));
        }

        let validated = v.validated();
        let field = |name: &str| {
            validated
                .get(name)
                .and_then(FieldValue::as_str)
                .unwrap_or("")
                .to_string()
        };

        Ok(ShippingAddress {
            address_line1: field("address_line1"),
            address_line2: field("address_line2"),
            city: field("city"),
            state: field("state"),
            postal_code: field("postal_code"),
            country: field("country"),
        })
    }

    /// Re-fetch every cart line from the trusted store and accumulate the
    /// authoritative total.
    async fn verify_lines(
        &self,
        cart: &[CartLine],
    ) -> Result<(Vec<VerifiedLine>, f64), CheckoutError> {
        let mut lines = Vec::with_capacity(cart.len());
        let mut total_amount = 0.0_f64;

        for item in cart {
            let product = self
                .products
                .get_product(item.product_id)
                .await
                .map_err(|err| CheckoutError::Integrity {
                    detail: format!("product lookup failed: {err}"),
                })?
                .ok_or_else(|| CheckoutError::Integrity {
                    detail: format!("product {} not found", item.product_id),
                })?;

            if item.quantity <= 0 || item.quantity > MAX_LINE_QUANTITY {
                return Err(CheckoutError::Integrity {
                    detail: format!(
                        "invalid quantity {} for product {}",
                        item.quantity, item.product_id
                    ),
                });
            }

            total_amount += product.price * item.quantity as f64;

            lines.push(VerifiedLine {
                product_id: product.id,
                name: product.name,
                price: product.price,
                quantity: item.quantity,
                image_url: product.image_url,
            });
        }

        Ok((lines, total_amount))
    }
}
