//! HTTP request handlers, one module per resource.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod products;
pub mod reviews;
