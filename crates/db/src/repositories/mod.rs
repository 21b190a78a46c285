//! Repositories: one unit struct per table, taking `&PgPool` per call.

pub mod order_repo;
pub mod product_repo;
pub mod review_repo;
pub mod user_repo;

pub use order_repo::OrderRepo;
pub use product_repo::ProductRepo;
pub use review_repo::ReviewRepo;
pub use user_repo::UserRepo;
