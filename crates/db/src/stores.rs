//! Postgres-backed implementations of the core storage traits.
//!
//! These are the trusted-store collaborators injected into the validator
//! and the checkout pipeline. Internal sqlx errors are logged here and
//! surfaced as opaque `CoreError::Internal` values so callers fail closed
//! without leaking detail.

use async_trait::async_trait;
use atelier_core::account::{CredentialStore, Credentials};
use atelier_core::checkout::{OrderDraft, OrderStore, ProductInfo, ProductStore};
use atelier_core::error::CoreError;
use atelier_core::types::{DbId, Timestamp};
use atelier_core::validation::UniquenessStore;
use sqlx::PgPool;

use crate::repositories::{OrderRepo, ProductRepo, UserRepo};

/// (table, column, SQL) triples the `unique` rule may query. Anything
/// else is a configuration error; table and column names are never
/// interpolated from rule parameters.
const UNIQUE_LOOKUPS: &[(&str, &str, &str)] = &[(
    "users",
    "email",
    "SELECT COUNT(*) FROM users WHERE email = $1",
)];

const UNIQUE_LOOKUPS_EXCLUDING: &[(&str, &str, &str)] = &[(
    "users",
    "email",
    "SELECT COUNT(*) FROM users WHERE email = $1 AND id != $2",
)];

/// Authoritative product lookup against the `products` table.
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn get_product(&self, id: DbId) -> Result<Option<ProductInfo>, CoreError> {
        let product = ProductRepo::find_by_id(&self.pool, id).await.map_err(|err| {
            tracing::error!(error = %err, product_id = id, "Product lookup failed");
            CoreError::Internal("product lookup failed".into())
        })?;

        Ok(product.map(|p| ProductInfo {
            id: p.id,
            name: p.name,
            price: p.price,
            image_url: p.image_url,
        }))
    }
}

/// Transactional order persistence against `orders` / `order_items` /
/// `user_addresses`.
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create_order(&self, draft: &OrderDraft) -> Result<DbId, CoreError> {
        OrderRepo::create_with_items(&self.pool, draft)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, user_id = draft.user_id, "Order commit failed");
                CoreError::Internal("order commit failed".into())
            })
    }
}

/// Credential reads and lockout bookkeeping for the login sequence,
/// against the `users` table.
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credentials>, CoreError> {
        let user = UserRepo::find_by_email(&self.pool, email)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "Credential lookup failed");
                CoreError::Internal("credential lookup failed".into())
            })?;

        Ok(user.map(|u| Credentials {
            user_id: u.id,
            password_hash: u.password_hash,
            failed_login_count: u.failed_login_count,
            locked_until: u.locked_until,
        }))
    }

    async fn record_failure(&self, user_id: DbId) -> Result<(), CoreError> {
        UserRepo::increment_failed_login(&self.pool, user_id)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, user_id, "Failed-login update failed");
                CoreError::Internal("failed-login update failed".into())
            })
    }

    async fn lock_until(&self, user_id: DbId, until: Timestamp) -> Result<(), CoreError> {
        UserRepo::lock_account(&self.pool, user_id, until)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, user_id, "Account lock update failed");
                CoreError::Internal("account lock update failed".into())
            })
    }

    async fn record_success(&self, user_id: DbId) -> Result<(), CoreError> {
        UserRepo::record_successful_login(&self.pool, user_id)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, user_id, "Login bookkeeping update failed");
                CoreError::Internal("login bookkeeping update failed".into())
            })
    }
}

/// Uniqueness lookups for the validator's `unique` rule, restricted to the
/// whitelist above.
pub struct PgUniquenessStore {
    pool: PgPool,
}

impl PgUniquenessStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UniquenessStore for PgUniquenessStore {
    async fn count_where(
        &self,
        table: &str,
        column: &str,
        value: &str,
        exclude_id: Option<DbId>,
    ) -> Result<i64, CoreError> {
        let lookups = if exclude_id.is_some() {
            UNIQUE_LOOKUPS_EXCLUDING
        } else {
            UNIQUE_LOOKUPS
        };

        let Some((_, _, sql)) = lookups
            .iter()
            .find(|(t, c, _)| *t == table && *c == column)
        else {
            return Err(CoreError::Internal(format!(
                "uniqueness lookup not configured for {table}.{column}"
            )));
        };

        let mut query = sqlx::query_as::<_, (i64,)>(sql).bind(value);
        if let Some(id) = exclude_id {
            query = query.bind(id);
        }

        let (count,) = query.fetch_one(&self.pool).await.map_err(|err| {
            tracing::error!(error = %err, table, column, "Uniqueness query failed");
            CoreError::Internal("uniqueness query failed".into())
        })?;

        Ok(count)
    }
}
