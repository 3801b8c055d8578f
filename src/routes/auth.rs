//! Auth routes for signup and login

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::post,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::models::{CredentialsRequest, TokenResponse};
use crate::auth::password::CredentialError;
use crate::database::store::StoreError;
use crate::error::ApiError;
use crate::routes::{decode_json, method_not_allowed};
use crate::server::AppState;

/// Shared by every login failure so unknown emails and wrong passwords look alike
const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub async fn signup(
    State(app_state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let payload: CredentialsRequest = decode_json(&body)?;
    let (email, password) = payload
        .normalized()
        .ok_or(ApiError::InvalidArgument("Email and password are required"))?;

    let hasher = app_state.hasher.clone();
    let password = password.to_string();
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

    // uniqueness is enforced by the store, not by a prior lookup
    let user = match app_state
        .users
        .create_user(Uuid::new_v4(), &email, &password_hash)
        .await
    {
        Ok(user) => user,
        Err(StoreError::UniqueViolation(_)) => {
            return Err(ApiError::Conflict("User already exists"));
        }
        Err(e) => return Err(e.into()),
    };

    let issued = app_state.jwt_service.create_token(user.id, &user.email, Utc::now())?;
    tracing::info!("User {} signed up", user.id);

    Ok((StatusCode::CREATED, Json(issued.into())))
}

pub async fn login(
    State(app_state): State<AppState>,
    body: Bytes,
) -> Result<Json<TokenResponse>, ApiError> {
    let payload: CredentialsRequest = decode_json(&body)?;
    let (email, password) = payload
        .normalized()
        .ok_or(ApiError::InvalidArgument("Email and password are required"))?;

    let user = app_state.users.find_user_by_email(&email).await?;

    let hasher = app_state.hasher.clone();
    let password = password.to_string();
    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let verified = tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => hasher.verify(&password, &hash),
        None => hasher.verify_dummy(&password),
    })
    .await?;

    let user = match (user, verified) {
        (Some(user), Ok(())) => user,
        (_, Err(e @ CredentialError::Hashing(_))) => return Err(e.into()),
        (Some(user), Err(CredentialError::MalformedHash)) => {
            tracing::error!("Stored password hash for user {} is malformed", user.id);
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
        }
        _ => return Err(ApiError::Unauthorized(INVALID_CREDENTIALS)),
    };

    let issued = app_state.jwt_service.create_token(user.id, &user.email, Utc::now())?;
    tracing::info!("User {} logged in", user.id);

    Ok(Json(issued.into()))
}

pub fn create_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup).fallback(method_not_allowed))
        .route("/login", post(login).fallback(method_not_allowed))
}
