//! Domain logic for the Atelier storefront.
//!
//! Pure logic only: the validation engine, checkout integrity pipeline,
//! cart model, and account/review policy live here behind explicit trait
//! seams. All I/O (Postgres, sessions) is implemented by the `db` and
//! `api` crates against the traits defined in this crate.

pub mod account;
pub mod cart;
pub mod checkout;
pub mod error;
pub mod review;
pub mod types;
pub mod validation;
