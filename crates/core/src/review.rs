//! Product review constraints and aggregation.

/// Lowest accepted star rating.
pub const MIN_RATING: i32 = 1;

/// Highest accepted star rating.
pub const MAX_RATING: i32 = 5;

/// Minimum review comment length.
pub const MIN_COMMENT_LENGTH: usize = 10;

/// Maximum review comment length.
pub const MAX_COMMENT_LENGTH: usize = 1000;

/// Rule chain for the review rating field.
pub const RATING_RULES: &str = "required|integer|in:1,2,3,4,5";

/// Rule chain for the review comment field.
pub const COMMENT_RULES: &str = "required|min:10|max:1000";

/// Average rating rounded to one decimal place; `0.0` with no reviews.
pub fn average_rating(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i32 = ratings.iter().sum();
    let avg = f64::from(sum) / ratings.len() as f64;
    (avg * 10.0).round() / 10.0
}
