use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::auth::{generate_jwt, hash_password, verify_password, Claims};
use crate::config;
use crate::database::manager::DatabaseManager;
use crate::database::models::UserPublic;
use crate::database::stores::users;
use crate::database::StoreError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserPublic,
    pub expires_in: u64,
}

/// POST /auth/register - Create a user account
pub async fn register(Json(payload): Json<RegisterRequest>) -> ApiResult<UserPublic> {
    if payload.username.trim().is_empty() {
        return Err(ApiError::field_error("username", "Username is required"));
    }
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(ApiError::field_error("email", "A valid email address is required"));
    }
    if payload.password.chars().count() < 8 {
        return Err(ApiError::field_error(
            "password",
            "Password must be at least 8 characters",
        ));
    }
    if payload.password != payload.password2 {
        return Err(ApiError::field_error("password2", "Passwords do not match"));
    }

    let pool = DatabaseManager::pool().await?;
    let digest = hash_password(&payload.password);

    let user = users::create(&pool, payload.username.trim(), payload.email.trim(), &digest)
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation(field) => {
                let message = format!("This {} is already in use", field);
                ApiError::field_error(field, message)
            }
            other => ApiError::from(other),
        })?;

    Ok(ApiResponse::created(UserPublic::from(&user)))
}

/// POST /auth/login - Authenticate credentials and receive a bearer token
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<LoginResponse> {
    let pool = DatabaseManager::pool().await?;

    let user = users::find_by_username(&pool, payload.username.trim())
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    if !verify_password(&payload.password, &user.password_digest) {
        return Err(ApiError::unauthorized("Invalid username or password"));
    }
    if !user.is_active {
        return Err(ApiError::unauthorized("Account is inactive"));
    }

    let claims = Claims::new(user.id, user.username.clone(), user.is_active);
    let token = generate_jwt(claims).map_err(|e| {
        tracing::error!("Token generation failed: {}", e);
        ApiError::internal_server_error("Failed to issue token")
    })?;

    Ok(ApiResponse::success(LoginResponse {
        token,
        user: UserPublic::from(&user),
        expires_in: config::config().security.jwt_expiry_hours * 3600,
    }))
}

/// GET /api/auth/whoami - Echo the authenticated principal
pub async fn whoami(AuthUser(principal): AuthUser) -> ApiResult<UserPublic> {
    let pool = DatabaseManager::pool().await?;
    let user = users::fetch(&pool, principal.id).await?;
    Ok(ApiResponse::success(UserPublic::from(&user)))
}
