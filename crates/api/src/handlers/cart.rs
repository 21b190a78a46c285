//! Handlers for the `/cart` resource.
//!
//! The cart is server-side session state: clients send product ids and
//! quantities, never prices. Names, prices, and images stored on cart
//! lines come from the product table at add time and are display hints
//! only; checkout re-derives them from the store again.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use atelier_core::cart::{add_line, remove_line, CartLine};
use atelier_core::checkout::MAX_LINE_QUANTITY;
use atelier_core::error::CoreError;
use atelier_core::types::DbId;
use atelier_db::repositories::ProductRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /cart/items`.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: DbId,
    /// Defaults to 1 when omitted.
    pub quantity: Option<i64>,
}

/// Cart contents with a display subtotal. The subtotal is advisory; the
/// authoritative total is computed at checkout.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub subtotal: f64,
}

fn cart_view(items: Vec<CartLine>) -> CartView {
    let subtotal = items.iter().map(|l| l.price * l.quantity as f64).sum();
    CartView { items, subtotal }
}

/// GET /api/cart
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<CartView>>> {
    let items = state.carts.get_cart(auth.user_id).await;
    Ok(Json(DataResponse {
        data: cart_view(items),
    }))
}

/// POST /api/cart/items
///
/// Add a product to the cart, merging quantity if it is already present.
/// The product must exist; the stored line takes its name and price from
/// the catalog row, not the request.
pub async fn add_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<AddItemRequest>,
) -> AppResult<Json<DataResponse<CartView>>> {
    let quantity = input.quantity.unwrap_or(1);
    if quantity < 1 || quantity > MAX_LINE_QUANTITY {
        return Err(AppError::BadRequest(format!(
            "Quantity must be between 1 and {MAX_LINE_QUANTITY}"
        )));
    }

    let product = ProductRepo::find_by_id(&state.pool, input.product_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id: input.product_id,
        }))?;

    let mut items = state.carts.get_cart(auth.user_id).await;
    add_line(
        &mut items,
        CartLine {
            product_id: product.id,
            name: product.name,
            price: product.price,
            quantity,
            image_url: product.image_url,
        },
    );
    state.carts.set_cart(auth.user_id, items.clone()).await;

    Ok(Json(DataResponse {
        data: cart_view(items),
    }))
}

/// DELETE /api/cart/items/{product_id}
pub async fn remove_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(product_id): Path<DbId>,
) -> AppResult<Json<DataResponse<CartView>>> {
    let mut items = state.carts.get_cart(auth.user_id).await;

    if !remove_line(&mut items, product_id) {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Cart item",
            id: product_id,
        }));
    }
    state.carts.set_cart(auth.user_id, items.clone()).await;

    Ok(Json(DataResponse {
        data: cart_view(items),
    }))
}

/// DELETE /api/cart
///
/// Empty the cart. Returns 204 No Content.
pub async fn clear(State(state): State<AppState>, auth: AuthUser) -> AppResult<StatusCode> {
    state.carts.set_cart(auth.user_id, Vec::new()).await;
    Ok(StatusCode::NO_CONTENT)
}
