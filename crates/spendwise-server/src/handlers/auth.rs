//! Authentication handlers: registration, login, and profile

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::read_json;
use crate::{ApiError, AppState, AuthUser};
use spendwise_core::auth;
use spendwise_core::models::User;

/// Minimum accepted password length
const MIN_PASSWORD_LEN: usize = 6;

/// Request body for registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Response for successful registration and login
#[derive(Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: User,
    pub token: String,
}

/// POST /api/v1/auth/register - Create a user account
pub async fn register(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let req: RegisterRequest = read_json(request).await?;

    let email = req.email.as_deref().map(str::trim).unwrap_or("");
    let password = req.password.as_deref().map(str::trim).unwrap_or("");
    let first_name = req.first_name.as_deref().map(str::trim).unwrap_or("");
    let last_name = req.last_name.as_deref().map(str::trim).unwrap_or("");
    let phone = req
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());

    if email.is_empty() || password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(
            "Password must be at least 6 characters",
        ));
    }

    if state.db.get_user_by_email(email)?.is_some() {
        return Err(ApiError::user_exists("Email already registered"));
    }

    let password_hash = auth::hash_password(password)?;
    let user_id = state
        .db
        .create_user(email, &password_hash, first_name, last_name, phone)?;
    let user = state
        .db
        .get_user(user_id)?
        .ok_or_else(|| ApiError::internal("User not found after creation"))?;

    let token = state.tokens.issue(user.id)?;

    info!(user_id = user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully".to_string(),
            user,
            token,
        }),
    ))
}

/// POST /api/v1/auth/login - Exchange credentials for a token
pub async fn login(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<AuthResponse>, ApiError> {
    let req: LoginRequest = read_json(request).await?;

    let email = req.email.as_deref().map(str::trim).unwrap_or("");
    let password = req.password.as_deref().map(str::trim).unwrap_or("");

    if email.is_empty() || password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    let user = match state.db.get_user_by_email(email)? {
        Some(user) if auth::verify_password(password, &user.password_hash) => user,
        _ => {
            warn!(email = %email, "Failed login attempt");
            return Err(ApiError::invalid_credentials());
        }
    };

    if !user.is_active {
        return Err(ApiError::account_disabled());
    }

    let token = state.tokens.issue(user.id)?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user,
        token,
    }))
}

/// GET /api/v1/auth/profile - Fetch the authenticated user's profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<User>, ApiError> {
    let user = state
        .db
        .get_user(user_id)?
        .ok_or_else(|| ApiError::user_not_found("User not found"))?;

    Ok(Json(user))
}
