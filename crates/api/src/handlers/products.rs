//! Handlers for the `/products` resource (catalog browsing).

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use atelier_core::error::CoreError;
use atelier_core::types::DbId;
use atelier_db::models::product::{Product, ProductWithCategory};
use atelier_db::repositories::ProductRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /products`.
#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    /// Restrict the listing to one category.
    pub category_id: Option<DbId>,
}

/// GET /api/products
///
/// List the catalog, optionally filtered by category.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> AppResult<Json<DataResponse<Vec<ProductWithCategory>>>> {
    let products = match query.category_id {
        Some(category_id) => ProductRepo::list_by_category(&state.pool, category_id).await?,
        None => ProductRepo::list(&state.pool).await?,
    };

    Ok(Json(DataResponse { data: products }))
}

/// GET /api/products/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Product>>> {
    let product = ProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id,
        }))?;

    Ok(Json(DataResponse { data: product }))
}
