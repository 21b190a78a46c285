//! Declarative field validation engine.
//!
//! Rules are written as pipe-delimited chains (`"required|min:8|max:255"`)
//! and evaluated in declaration order, short-circuiting on the first
//! failure per field. Sanitization is a separate output-safety pass over
//! the fields that validated cleanly.

pub mod engine;
pub mod rules;
pub mod sanitize;

pub use engine::{FieldContext, FieldValue, UniquenessStore, Validator};
pub use rules::{Rule, RuleSpec};
