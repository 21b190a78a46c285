//! Handlers for product reviews (`/products/{id}/reviews`).

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use atelier_core::error::CoreError;
use atelier_core::review::{average_rating, COMMENT_RULES, RATING_RULES};
use atelier_core::types::{DbId, Timestamp};
use atelier_core::validation::sanitize::sanitize;
use atelier_core::validation::{FieldValue, Validator};
use atelier_db::models::review::{CreateReview, Review};
use atelier_db::repositories::{ProductRepo, ReviewRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /products/{id}/reviews`.
///
/// `rating` arrives as a string so the rule engine can apply the
/// `integer` and `in` rules exactly as it does for form input.
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: String,
    pub comment: String,
}

/// One review as rendered in a product's review listing. `comment` and
/// `user_name` are HTML-escaped.
#[derive(Debug, Serialize)]
pub struct ReviewView {
    pub id: DbId,
    pub rating: i32,
    pub comment: String,
    pub user_name: String,
    pub created_at: Timestamp,
}

/// Review listing with aggregates.
#[derive(Debug, Serialize)]
pub struct ReviewListResponse {
    pub reviews: Vec<ReviewView>,
    pub average_rating: f64,
    pub count: usize,
}

/// GET /api/products/{id}/reviews
pub async fn list(
    State(state): State<AppState>,
    Path(product_id): Path<DbId>,
) -> AppResult<Json<DataResponse<ReviewListResponse>>> {
    ensure_product_exists(&state, product_id).await?;

    let rows = ReviewRepo::list_for_product(&state.pool, product_id).await?;

    let ratings: Vec<i32> = rows.iter().map(|r| r.rating).collect();
    let reviews: Vec<ReviewView> = rows
        .into_iter()
        .map(|r| ReviewView {
            id: r.id,
            rating: r.rating,
            // Escape at the output boundary; rows store raw text.
            comment: sanitize(&r.comment),
            user_name: sanitize(&r.user_name),
            created_at: r.created_at,
        })
        .collect();

    Ok(Json(DataResponse {
        data: ReviewListResponse {
            average_rating: average_rating(&ratings),
            count: reviews.len(),
            reviews,
        },
    }))
}

/// POST /api/products/{id}/reviews
///
/// One review per user per product. Returns 201 with the created row.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(product_id): Path<DbId>,
    Json(input): Json<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Review>>)> {
    ensure_product_exists(&state, product_id).await?;

    let data: BTreeMap<String, FieldValue> = [
        (
            "rating".to_string(),
            FieldValue::from(input.rating.as_str()),
        ),
        (
            "comment".to_string(),
            FieldValue::from(input.comment.as_str()),
        ),
    ]
    .into();

    let mut v = Validator::new(data);
    v.validate("rating", "Rating", RATING_RULES)
        .await
        .validate("comment", "Comment", COMMENT_RULES)
        .await;

    if v.fails() {
        return Err(AppError::from_validator(&v));
    }

    if ReviewRepo::exists_for_user_and_product(&state.pool, auth.user_id, product_id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "You have already reviewed this product".into(),
        )));
    }

    // The integer rule has already vetted the rating string.
    let rating: i32 = input
        .rating
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest("Rating must be a whole number".into()))?;

    let create = CreateReview {
        user_id: auth.user_id,
        product_id,
        rating,
        comment: input.comment.trim().to_string(),
    };

    let review = ReviewRepo::create(&state.pool, &create).await?;

    tracing::info!(review_id = review.id, product_id, "Review created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: review })))
}

async fn ensure_product_exists(state: &AppState, product_id: DbId) -> AppResult<()> {
    ProductRepo::find_by_id(&state.pool, product_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id: product_id,
        }))?;
    Ok(())
}
