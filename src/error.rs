//! HTTP error taxonomy
//!
//! Every handler failure becomes one of these, and each maps to a status code
//! with a plain-text body. Internal details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::auth::jwt::TokenError;
use crate::auth::password::CredentialError;
use crate::database::store::StoreError;
use crate::database::update_builder::UpdateError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidArgument(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal server error")]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(e) = &self {
            tracing::error!("Internal error: {:#}", e);
        }

        (self.status(), self.to_string()).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation(_) => ApiError::Conflict("Resource already exists"),
            StoreError::Backend(e) => ApiError::Internal(e),
        }
    }
}

impl From<UpdateError> for ApiError {
    fn from(e: UpdateError) -> Self {
        match e {
            UpdateError::NoFieldsProvided => ApiError::InvalidArgument("No fields to update"),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(e: CredentialError) -> Self {
        ApiError::Internal(anyhow::Error::new(e))
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        ApiError::Internal(anyhow::Error::new(e))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(anyhow::Error::new(e).context("Blocking task failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(error: ApiError) -> (StatusCode, String) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let (status, body) =
            body_of(ApiError::Internal(anyhow::anyhow!("connection refused at 10.0.0.5"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal server error");
    }

    #[tokio::test]
    async fn test_plain_text_messages() {
        assert_eq!(
            body_of(ApiError::InvalidArgument("Invalid todo ID")).await,
            (StatusCode::BAD_REQUEST, "Invalid todo ID".to_string())
        );
        assert_eq!(
            body_of(ApiError::MethodNotAllowed).await,
            (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
        );
    }

    #[test]
    fn test_store_error_mapping() {
        let conflict: ApiError = StoreError::UniqueViolation("users.email".to_string()).into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let backend: ApiError = StoreError::Backend(anyhow::anyhow!("boom")).into();
        assert_eq!(backend.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let empty: ApiError = UpdateError::NoFieldsProvided.into();
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
        assert_eq!(empty.to_string(), "No fields to update");
    }
}
