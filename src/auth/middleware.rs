//! Authentication Middleware
//!
//! Axum middleware for bearer-token validation. Applied to the todo routes
//! only when `REQUIRE_AUTH` is enabled.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::sync::Arc;

use crate::auth::{jwt::JwtService, models::AuthUser};
use crate::error::ApiError;

/// Authentication middleware that validates JWT tokens and injects user info
pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Middleware function for validating JWT tokens
    pub async fn validate_token(
        State(jwt_service): State<Arc<JwtService>>,
        mut req: Request,
        next: Next,
    ) -> Result<Response, ApiError> {
        let Some(token) = bearer_token(&req) else {
            tracing::warn!("[AuthMiddleware] Missing bearer token for {} {}", req.method(), req.uri());
            return Err(ApiError::Unauthorized("Missing or invalid bearer token"));
        };

        let claims = match jwt_service.validate_token(token, Utc::now()) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!("[AuthMiddleware] JWT validation failed: {}", e);
                return Err(ApiError::Unauthorized("Missing or invalid bearer token"));
            }
        };

        let auth_user = AuthUser {
            id: claims.sub,
            email: claims.email,
        };
        tracing::debug!("[AuthMiddleware] Authenticated user id={}", auth_user.id);

        req.extensions_mut().insert(auth_user);

        Ok(next.run(req).await)
    }
}

/// Token from `Authorization: Bearer <token>`; the scheme is case-insensitive
fn bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim_start().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
