use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::{
    extract::State,
    routing::post,
    Json,
    Router,
};
use carrel_core::identity::{Role, User};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, middleware::auth::issue_token, state::AppState};

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    email: String,
    password: String,
    full_name: String,
    role: Option<Role>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
    user_id: Uuid,
    role: Role,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/register", post(register))
        .route("/v1/auth/login", post(login))
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if !req.email.contains('@') {
        return Err(AppError::ValidationError("invalid email address".to_string()));
    }

    let min_length = state.settings.read().await.security.password_min_length;
    if req.password.chars().count() < min_length {
        return Err(AppError::ValidationError(format!(
            "password must be at least {} characters",
            min_length
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| AppError::InternalServerError(format!("password hashing failed: {}", e)))?
        .to_string();

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        email: req.email.to_lowercase(),
        password_hash,
        full_name: req.full_name,
        role: req.role.unwrap_or(Role::Member),
        created_at: now,
        updated_at: now,
    };

    state.users.create(&user).await.map_err(|e| {
        use carrel_core::repository::RepoError;
        match e {
            RepoError::Duplicate(_) => AppError::ConflictError("email already registered".to_string()),
            other => other.into(),
        }
    })?;

    let token = issue_token(&user, &state.auth.secret, state.auth.expiration)
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "user registered");

    Ok(Json(AuthResponse {
        token,
        user_id: user.id,
        role: user.role,
    }))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = state
        .users
        .find_by_email(&req.email.to_lowercase())
        .await?
        .ok_or_else(|| AppError::AuthenticationError("invalid credentials".to_string()))?;

    let parsed = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("stored hash unreadable: {}", e)))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed)
        .map_err(|_| AppError::AuthenticationError("invalid credentials".to_string()))?;

    let token = issue_token(&user, &state.auth.secret, state.auth.expiration)
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    Ok(Json(AuthResponse {
        token,
        user_id: user.id,
        role: user.role,
    }))
}
