//! Handler for `POST /checkout`.
//!
//! Thin HTTP shell around the checkout pipeline in `atelier_core`: it
//! supplies the server-side cart and the Postgres-backed stores, and
//! clears the cart only after the order has committed.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use atelier_core::checkout::{CheckoutPipeline, CheckoutRequest};
use atelier_core::types::DbId;
use atelier_db::stores::{PgOrderStore, PgProductStore};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /checkout`. Prices are deliberately absent:
/// the pipeline re-derives them from the product table.
#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    pub address: BTreeMap<String, String>,
    pub payment_method: String,
}

/// Successful checkout response.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: DbId,
    pub total_amount: f64,
}

/// POST /api/checkout
pub async fn checkout(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CheckoutBody>,
) -> AppResult<(StatusCode, Json<DataResponse<CheckoutResponse>>)> {
    let cart = state.carts.get_cart(auth.user_id).await;

    let products = PgProductStore::new(state.pool.clone());
    let orders = PgOrderStore::new(state.pool.clone());
    let pipeline = CheckoutPipeline::new(&products, &orders);

    let request = CheckoutRequest {
        address: input.address,
        payment_method: input.payment_method,
    };

    let receipt = pipeline.checkout(auth.user_id, &cart, &request).await?;

    // The order committed; only now does the cart go away. Any earlier
    // failure leaves it intact for a retry.
    state.carts.set_cart(auth.user_id, Vec::new()).await;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CheckoutResponse {
                order_id: receipt.order_id,
                total_amount: receipt.total_amount,
            },
        }),
    ))
}
