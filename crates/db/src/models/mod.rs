//! Entity structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct
//! matching the database row, plus the create DTOs the repositories
//! accept.

pub mod order;
pub mod product;
pub mod review;
pub mod user;
