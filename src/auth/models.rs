//! Authentication Models
//!
//! Data structures for authentication requests, responses, and user information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::jwt::IssuedToken;

/// Authenticated user information extracted from JWT
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Signup and login payload. Missing and `null` fields count as blank.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl CredentialsRequest {
    /// Trimmed, lowercased email; `None` when either field is blank
    pub fn normalized(&self) -> Option<(String, &str)> {
        let email = self.email.as_deref().unwrap_or_default().trim().to_lowercase();
        let password = self.password.as_deref().unwrap_or_default();
        if email.is_empty() || password.trim().is_empty() {
            return None;
        }
        Some((email, password))
    }
}

/// Token response after successful authentication
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: i64,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            expires_at: issued.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_credentials() {
        let req = CredentialsRequest {
            email: Some("  Alice@Example.COM ".to_string()),
            password: Some("pw".to_string()),
        };
        assert_eq!(req.normalized(), Some(("alice@example.com".to_string(), "pw")));
    }

    #[test]
    fn test_blank_credentials_rejected() {
        let req: CredentialsRequest = serde_json::from_str(r#"{"email":"a@b.c"}"#).unwrap();
        assert!(req.normalized().is_none());

        let req = CredentialsRequest {
            email: Some("   ".to_string()),
            password: Some("pw".to_string()),
        };
        assert!(req.normalized().is_none());

        let req: CredentialsRequest =
            serde_json::from_str(r#"{"email":null,"password":"pw"}"#).unwrap();
        assert!(req.normalized().is_none());
    }
}
