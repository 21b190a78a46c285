//! Authentication: password hashing and session token management.

pub mod password;
pub mod session;
