// # Routes Module
//
// - HTTP route handlers for the todo server, one submodule per API area.
// - Each submodule exposes a `create_*_routes()` builder merged in `server.rs`.

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Health check and monitoring endpoints
pub mod health;

/// Todo CRUD endpoints
pub mod todos;

/// Signup and login endpoints
pub mod auth;

/// Decode a JSON request body regardless of Content-Type
pub(crate) fn decode_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Rejected request body: {}", e);
        ApiError::InvalidArgument("Invalid JSON")
    })
}

/// Fallback for methods a route does not serve
pub(crate) async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
