//! Validation engine: field context, rule evaluation, error aggregation.
//!
//! Each field is validated against an ordered rule chain; the first failing
//! rule records that field's error message and stops the chain, so a field
//! carries at most one error. The `unique` rule is the only rule with I/O
//! and runs through an injected [`UniquenessStore`] collaborator.

use std::collections::BTreeMap;

use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use validator::{ValidateEmail, ValidateUrl};

use super::rules::{parse_chain, ChainToken, Rule, RuleSpec};
use super::sanitize;
use crate::error::CoreError;
use crate::types::DbId;

/// A raw input value: a string, or a nested list of values (sanitized
/// recursively).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Str(String),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            FieldValue::List(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

/// The full input record under validation. Cross-field rules (`match`)
/// read sibling values from here.
pub type FieldContext = BTreeMap<String, FieldValue>;

/// Storage collaborator for the `unique` rule.
///
/// Implementations must restrict lookups to known (table, column) pairs
/// and return an error otherwise; the rule fails closed on any error.
#[async_trait]
pub trait UniquenessStore: Send + Sync {
    async fn count_where(
        &self,
        table: &str,
        column: &str,
        value: &str,
        exclude_id: Option<DbId>,
    ) -> Result<i64, CoreError>;
}

/// Rule-based field validator.
///
/// ```ignore
/// let mut v = Validator::new(fields);
/// v.validate("email", "Email", "required|email|max:255").await
///     .validate("password", "Password", "required|password|min:8").await;
/// if v.fails() {
///     return Err(v.first_error().unwrap_or_default().into());
/// }
/// let clean = v.validated();
/// ```
pub struct Validator<'a> {
    data: FieldContext,
    /// (field, message) pairs in declaration order; one entry per field,
    /// overwritten if the field is validated again.
    errors: Vec<(String, String)>,
    store: Option<&'a dyn UniquenessStore>,
    strict: bool,
}

impl<'a> Validator<'a> {
    pub fn new(data: FieldContext) -> Self {
        Self {
            data,
            errors: Vec::new(),
            store: None,
            strict: false,
        }
    }

    /// Inject the storage collaborator required by the `unique` rule.
    /// Without it, `unique` fails closed.
    pub fn with_uniqueness_store(mut self, store: &'a dyn UniquenessStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Treat unknown rule names as a configuration error instead of
    /// silently skipping them.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Validate one field against a rule chain. Chainable; the first
    /// failing rule wins and later rules in the chain do not run.
    pub async fn validate(&mut self, field: &str, label: &str, rules: &str) -> &mut Self {
        let value = self
            .data
            .get(field)
            .and_then(FieldValue::as_str)
            .unwrap_or("")
            .to_string();

        for token in parse_chain(rules) {
            let spec = match token {
                ChainToken::Known(spec) => spec,
                ChainToken::Unknown(_) if !self.strict => continue,
                ChainToken::Unknown(_) => {
                    self.record_error(field, format!("{label} has an unknown validation rule"));
                    break;
                }
            };

            let outcome = match spec.rule {
                Rule::Unique => self.check_unique(&value, &spec.params, label).await,
                _ => apply_rule(&spec, &value, &self.data, label),
            };

            if let Err(message) = outcome {
                self.record_error(field, message);
                break;
            }
        }

        self
    }

    /// Record a field's error, overwriting any earlier message for the
    /// same field so a field never carries more than one entry.
    fn record_error(&mut self, field: &str, message: String) {
        match self.errors.iter_mut().find(|(f, _)| f == field) {
            Some(entry) => entry.1 = message,
            None => self.errors.push((field.to_string(), message)),
        }
    }

    pub fn passes(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fails(&self) -> bool {
        !self.passes()
    }

    /// All errors, keyed by field name.
    pub fn errors(&self) -> BTreeMap<&str, &str> {
        self.errors
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
            .collect()
    }

    /// The first recorded error message, in validation order.
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(|(_, message)| message.as_str())
    }

    /// Sanitized values for every field with no recorded error.
    ///
    /// Output is HTML-safe: trimmed, NUL-stripped, entity-encoded. Apply
    /// exactly once per value; encoding is not idempotent when chained.
    pub fn validated(&self) -> BTreeMap<String, FieldValue> {
        self.data
            .iter()
            .filter(|(field, _)| !self.errors.iter().any(|(f, _)| f == *field))
            .map(|(field, value)| (field.clone(), sanitize::sanitize_value(value)))
            .collect()
    }

    async fn check_unique(
        &self,
        value: &str,
        params: &[String],
        label: &str,
    ) -> Result<(), String> {
        if value.is_empty() {
            return Ok(());
        }

        // Missing collaborator or missing table/column is a configuration
        // error: fail closed with a generic message, never pass silently.
        let Some(store) = self.store else {
            return Err(format!("{label} validation failed"));
        };

        let table = params.first().map(String::as_str).unwrap_or("");
        let column = params.get(1).map(String::as_str).unwrap_or("");
        if table.is_empty() || column.is_empty() {
            return Err(format!("{label} validation failed"));
        }

        let exclude_id = params.get(2).and_then(|p| p.parse::<DbId>().ok());

        match store.count_where(table, column, value, exclude_id).await {
            Ok(count) if count > 0 => Err(format!("{label} is already taken")),
            Ok(_) => Ok(()),
            Err(err) => {
                tracing::warn!(error = %err, table, column, "Uniqueness lookup failed, failing closed");
                Err(format!("{label} validation failed"))
            }
        }
    }
}

/// Evaluate a pure (non-I/O) rule against a field value.
fn apply_rule(spec: &RuleSpec, value: &str, data: &FieldContext, label: &str) -> Result<(), String> {
    match spec.rule {
        Rule::Required => check_required(value, label),
        Rule::Email => check_email(value, label),
        Rule::Min => check_min(value, &spec.params, label),
        Rule::Max => check_max(value, &spec.params, label),
        Rule::Password => check_password(value, label),
        Rule::Alpha => check_alpha(value, label),
        Rule::Alphanumeric => check_alphanumeric(value, label),
        Rule::Numeric => check_numeric(value, label),
        Rule::Integer => check_integer(value, label),
        Rule::PostalCode => check_postal_code(value, label),
        Rule::Url => check_url(value, label),
        Rule::Match => check_match(value, &spec.params, data, label),
        Rule::In => check_in(value, &spec.params, label),
        // Evaluated through the async storage path in `validate`.
        Rule::Unique => Ok(()),
    }
}

fn check_required(value: &str, label: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{label} is required"));
    }
    Ok(())
}

fn check_email(value: &str, label: &str) -> Result<(), String> {
    if !value.is_empty() && !value.validate_email() {
        return Err(format!("{label} must be a valid email address"));
    }
    Ok(())
}

fn check_min(value: &str, params: &[String], label: &str) -> Result<(), String> {
    let min = params
        .first()
        .and_then(|p| p.parse::<usize>().ok())
        .unwrap_or(0);
    if !value.is_empty() && value.chars().count() < min {
        return Err(format!("{label} must be at least {min} characters"));
    }
    Ok(())
}

fn check_max(value: &str, params: &[String], label: &str) -> Result<(), String> {
    let max = params
        .first()
        .and_then(|p| p.parse::<usize>().ok())
        .unwrap_or(255);
    if !value.is_empty() && value.chars().count() > max {
        return Err(format!("{label} must not exceed {max} characters"));
    }
    Ok(())
}

/// Password strength: length >= 8 with at least one uppercase letter, one
/// lowercase letter, and one digit. Empty passes; `required` enforces
/// presence.
fn check_password(value: &str, label: &str) -> Result<(), String> {
    if value.is_empty() {
        return Ok(());
    }
    if value.chars().count() < 8 {
        return Err(format!("{label} must be at least 8 characters"));
    }
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(format!("{label} must contain at least one uppercase letter"));
    }
    if !value.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(format!("{label} must contain at least one lowercase letter"));
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return Err(format!("{label} must contain at least one number"));
    }
    Ok(())
}

fn check_alpha(value: &str, label: &str) -> Result<(), String> {
    if !value.is_empty() && !value.chars().all(|c| c.is_alphabetic() || c.is_whitespace()) {
        return Err(format!("{label} must contain only letters"));
    }
    Ok(())
}

fn check_alphanumeric(value: &str, label: &str) -> Result<(), String> {
    if !value.is_empty() && !value.chars().all(|c| c.is_alphanumeric() || c.is_whitespace()) {
        return Err(format!("{label} must contain only letters and numbers"));
    }
    Ok(())
}

fn check_numeric(value: &str, label: &str) -> Result<(), String> {
    if !value.is_empty() && value.parse::<f64>().is_err() {
        return Err(format!("{label} must be a number"));
    }
    Ok(())
}

fn check_integer(value: &str, label: &str) -> Result<(), String> {
    if !value.is_empty() && value.parse::<i64>().is_err() {
        return Err(format!("{label} must be an integer"));
    }
    Ok(())
}

fn check_postal_code(value: &str, label: &str) -> Result<(), String> {
    if value.is_empty() {
        return Ok(());
    }
    let matched = Regex::new(r"^[A-Za-z0-9\s-]{3,10}$")
        .map(|re| re.is_match(value))
        .unwrap_or(false);
    if !matched {
        return Err(format!("{label} must be a valid postal code"));
    }
    Ok(())
}

fn check_url(value: &str, label: &str) -> Result<(), String> {
    if !value.is_empty() && !value.validate_url() {
        return Err(format!("{label} must be a valid URL"));
    }
    Ok(())
}

/// Strict equality with a sibling field's raw value (case and whitespace
/// sensitive). A missing parameter compares against the empty string.
fn check_match(
    value: &str,
    params: &[String],
    data: &FieldContext,
    label: &str,
) -> Result<(), String> {
    let sibling = params.first().map(String::as_str).unwrap_or("");
    let target = data
        .get(sibling)
        .and_then(FieldValue::as_str)
        .unwrap_or("");
    if value != target {
        return Err(format!("{label} must match {}", prettify_field(sibling)));
    }
    Ok(())
}

fn check_in(value: &str, params: &[String], label: &str) -> Result<(), String> {
    if !value.is_empty() && !params.iter().any(|allowed| allowed == value) {
        return Err(format!("{label} must be one of: {}", params.join(", ")));
    }
    Ok(())
}

/// `password_confirmation` -> `Password confirmation` for error messages.
fn prettify_field(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}
