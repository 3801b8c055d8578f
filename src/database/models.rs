// Database Models
//
// Tokio-postgres compatible models for the todo and user tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

/// Trait for converting from tokio-postgres Row
pub trait FromRow {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> where Self: Sized;
}

// ============================================================================
// TODO MODELS
// ============================================================================

/// A single todo item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: Uuid,
    pub todo: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow for Todo {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            todo: row.try_get("todo")?,
            completed: row.try_get("completed")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Column list selected for every todo query, in `FromRow` order
pub const TODO_COLUMNS: &str = "id, todo, completed, created_at, updated_at";

/// Create payload; a missing or `null` `todo` is treated as blank
#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub todo: Option<String>,
}

/// Partial update payload; absent fields are left untouched
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    pub todo: Option<String>,
    pub completed: Option<bool>,
}

// ============================================================================
// USER & AUTH MODELS
// ============================================================================

/// User account information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow for User {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

pub const USER_COLUMNS: &str = "id, email, password, created_at, updated_at";
