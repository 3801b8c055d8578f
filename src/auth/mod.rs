//! # Authentication Module
//!
//! Password hashing, JWT issuance and validation, and the optional bearer-token
//! middleware for the todo routes.

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;

pub use jwt::JwtService;
pub use password::{CredentialHasher, HashCost};
