//! Persistence ports
//!
//! Handlers talk to these traits; `DatabaseConnection` implements them over
//! Postgres and tests use the in-memory store.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{Todo, User};
use crate::database::update_builder::UpdateStatement;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All todos, newest creation first
    async fn list_todos(&self) -> StoreResult<Vec<Todo>>;

    async fn get_todo(&self, id: Uuid) -> StoreResult<Option<Todo>>;

    /// Insert a todo with server-assigned id and timestamps
    async fn create_todo(&self, text: &str) -> StoreResult<Todo>;

    /// Apply a partial update. `None` when no row has `id`.
    async fn update_todo(&self, id: Uuid, update: &UpdateStatement) -> StoreResult<Option<Todo>>;

    /// `false` when no row has `id`
    async fn delete_todo(&self, id: Uuid) -> StoreResult<bool>;

    async fn health_check(&self) -> StoreResult<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Insert a user. A second user with the same email fails with
    /// [`StoreError::UniqueViolation`].
    async fn create_user(&self, id: Uuid, email: &str, password_hash: &str) -> StoreResult<User>;
}
