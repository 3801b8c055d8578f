//! Configuration module for environment variables and application settings

use anyhow::{anyhow, Context, Result};
use std::env;
use std::str::FromStr;

use crate::auth::HashCost;
use crate::database::DatabaseConfig;

#[derive(Debug, Clone)]
pub struct Config {
    /// Database configuration
    pub database: DatabaseConfig,

    /// Server configuration
    pub server: ServerConfig,

    /// Authentication configuration
    pub auth: AuthConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty means any origin
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign tokens
    pub jwt_secret: String,
    /// Argon2 cost for new password hashes
    pub hash_cost: HashCost,
    /// Enforce bearer tokens on the todo routes
    pub require_auth: bool,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("hash_cost", &self.hash_cost)
            .field("require_auth", &self.require_auth)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut database = match lookup("DATABASE_URL") {
            Some(url) => DatabaseConfig::from_url(&url)?,
            None => DatabaseConfig::default(),
        };
        database.max_size = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", database.max_size)?;
        if let Some(mode) = lookup("DB_SSLMODE") {
            database.tls = mode != "disable";
        }

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.trim().is_empty())
            .ok_or_else(|| anyhow!("JWT_SECRET environment variable is required"))?;

        let defaults = HashCost::default();
        let hash_cost = HashCost {
            memory_kib: parse_or(&lookup, "PASSWORD_HASH_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&lookup, "PASSWORD_HASH_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&lookup, "PASSWORD_HASH_PARALLELISM", defaults.parallelism)?,
        };

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database,
            server: ServerConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "PORT", 8080)?,
                cors_allowed_origins,
            },
            auth: AuthConfig {
                jwt_secret,
                hash_cost,
                require_auth: parse_or(&lookup, "REQUIRE_AUTH", false)?,
            },
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}
