//! # Database Module
//!
//! PostgreSQL persistence using tokio-postgres with a deadpool connection pool.
//! Includes connection management, models, the partial-update builder and the
//! store traits the route handlers depend on.

pub mod connection;
pub mod models;
pub mod postgres;
pub mod store;
pub mod update_builder;

#[cfg(test)]
pub mod memory;

pub use connection::{DatabaseConfig, DatabaseConnection};
pub use store::{TodoStore, UserStore};
