//! Handlers for the `/auth` resource (register, login, logout, me).

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use atelier_core::account::{authenticate, LoginError};
use atelier_core::error::CoreError;
use atelier_core::validation::sanitize::sanitize_email;
use atelier_core::validation::{FieldValue, Validator};
use atelier_db::models::user::{CreateUser, UserResponse};
use atelier_db::repositories::UserRepo;
use atelier_db::stores::{PgCredentialStore, PgUniquenessStore};

use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Opaque session bearer token.
    pub token: String,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/register
///
/// Create an account. All fields run through the rule engine; the email
/// must not already be registered (checked through the `unique` rule, and
/// again by the database constraint to close the race).
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let data: BTreeMap<String, FieldValue> = [
        ("name".to_string(), FieldValue::from(input.name.as_str())),
        ("email".to_string(), FieldValue::from(input.email.as_str())),
        (
            "password".to_string(),
            FieldValue::from(input.password.as_str()),
        ),
        (
            "confirm_password".to_string(),
            FieldValue::from(input.confirm_password.as_str()),
        ),
    ]
    .into();

    let uniqueness = PgUniquenessStore::new(state.pool.clone());
    let mut v = Validator::new(data).with_uniqueness_store(&uniqueness);
    v.validate("name", "Name", "required|alpha|min:2|max:100")
        .await
        .validate(
            "email",
            "Email",
            "required|email|max:255|unique:users,email",
        )
        .await
        .validate("password", "Password", "required|password|min:8")
        .await
        .validate(
            "confirm_password",
            "Confirm Password",
            "required|match:password",
        )
        .await;

    if v.fails() {
        return Err(AppError::from_validator(&v));
    }

    let validated = v.validated();
    let name = validated
        .get("name")
        .and_then(FieldValue::as_str)
        .unwrap_or("")
        .to_string();

    let create = CreateUser {
        name,
        email: sanitize_email(&input.email),
        // The raw password goes to the hasher; sanitization is for output
        // contexts and would corrupt legitimate characters here.
        password_hash: hash_password(&input.password)
            .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?,
    };

    let user = UserRepo::create(&state.pool, &create).await?;

    tracing::info!(user_id = user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(user),
        }),
    ))
}

/// POST /api/auth/login
///
/// Authenticate with email + password. Five consecutive failures lock the
/// account for fifteen minutes; while locked, every attempt is rejected
/// before the password is checked.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<LoginResponse>>> {
    let data: BTreeMap<String, FieldValue> = [
        ("email".to_string(), FieldValue::from(input.email.as_str())),
        (
            "password".to_string(),
            FieldValue::from(input.password.as_str()),
        ),
    ]
    .into();

    let mut v = Validator::new(data);
    v.validate("email", "Email", "required|email|max:255")
        .await
        .validate("password", "Password", "required|min:8|max:255")
        .await;

    if v.fails() {
        return Err(AppError::from_validator(&v));
    }

    // 1. Run the login decision sequence (lock window before password,
    //    failure bookkeeping, generic message for unknown email and wrong
    //    password alike).
    let credentials = PgCredentialStore::new(state.pool.clone());
    let user_id = authenticate(
        &credentials,
        &sanitize_email(&input.email),
        Utc::now(),
        |hash| {
            verify_password(&input.password, hash)
                .map_err(|e| CoreError::Internal(format!("Password verification error: {e}")))
        },
    )
    .await
    .map_err(|err| {
        let message = err.to_string();
        match err {
            LoginError::InvalidCredentials => AppError::Core(CoreError::Unauthorized(message)),
            LoginError::Locked => AppError::Core(CoreError::Forbidden(message)),
            LoginError::Store(source) => AppError::Core(source),
        }
    })?;

    // 2. Load the profile for the response.
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "User",
                id: user_id,
            })
        })?;

    // 3. Issue a session token.
    let token = state.sessions.issue(user.id, &user.name).await;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(DataResponse {
        data: LoginResponse {
            token,
            user: UserResponse::from(user),
        },
    }))
}

/// POST /api/auth/logout
///
/// Revoke the presented session token. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> AppResult<StatusCode> {
    state.sessions.revoke(&auth.token).await;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/me
///
/// Return the authenticated user's profile.
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "User",
                id: auth.user_id,
            })
        })?;

    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}
