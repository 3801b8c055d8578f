//! Postgres implementation of the persistence ports

use anyhow::Context;
use async_trait::async_trait;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use uuid::Uuid;

use crate::database::connection::DatabaseConnection;
use crate::database::models::{FromRow, Todo, User, TODO_COLUMNS, USER_COLUMNS};
use crate::database::store::{StoreError, StoreResult, TodoStore, UserStore};
use crate::database::update_builder::UpdateStatement;

impl DatabaseConnection {
    async fn client(&self) -> StoreResult<deadpool_postgres::Object> {
        Ok(self.pool().get().await.context("Failed to get DB connection")?)
    }
}

fn row_error(e: tokio_postgres::Error) -> StoreError {
    StoreError::Backend(anyhow::Error::new(e).context("Failed to decode row"))
}

#[async_trait]
impl TodoStore for DatabaseConnection {
    async fn list_todos(&self) -> StoreResult<Vec<Todo>> {
        let client = self.client().await?;
        let rows = client
            .query(
                &format!("SELECT {TODO_COLUMNS} FROM todos ORDER BY created_at DESC"),
                &[],
            )
            .await
            .context("Failed to query todos")?;

        rows.iter()
            .map(|row| Todo::from_row(row).map_err(row_error))
            .collect()
    }

    async fn get_todo(&self, id: Uuid) -> StoreResult<Option<Todo>> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                &format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1"),
                &[&id],
            )
            .await
            .context("Failed to query todo")?;

        row.as_ref().map(Todo::from_row).transpose().map_err(row_error)
    }

    async fn create_todo(&self, text: &str) -> StoreResult<Todo> {
        let client = self.client().await?;
        let row = client
            .query_one(
                &format!("INSERT INTO todos (todo) VALUES ($1) RETURNING {TODO_COLUMNS}"),
                &[&text],
            )
            .await
            .context("Failed to insert todo")?;

        Todo::from_row(&row).map_err(row_error)
    }

    async fn update_todo(&self, id: Uuid, update: &UpdateStatement) -> StoreResult<Option<Todo>> {
        let columns: Vec<&str> = update.assignments().map(|(column, _)| column).collect();
        tracing::debug!("Updating todo {} columns {:?}", id, columns);

        let sql = update.to_sql("id", TODO_COLUMNS);
        let mut params: Vec<&(dyn ToSql + Sync)> =
            update.args().iter().map(|arg| arg.as_param()).collect();
        params.push(&id);

        let client = self.client().await?;
        let row = client
            .query_opt(&sql, &params)
            .await
            .context("Failed to update todo")?;

        row.as_ref().map(Todo::from_row).transpose().map_err(row_error)
    }

    async fn delete_todo(&self, id: Uuid) -> StoreResult<bool> {
        let client = self.client().await?;
        let affected = client
            .execute("DELETE FROM todos WHERE id = $1", &[&id])
            .await
            .context("Failed to delete todo")?;
        Ok(affected > 0)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(self.ping().await?)
    }
}

#[async_trait]
impl UserStore for DatabaseConnection {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"),
                &[&email],
            )
            .await
            .context("Failed to query user by email")?;

        row.as_ref().map(User::from_row).transpose().map_err(row_error)
    }

    async fn create_user(&self, id: Uuid, email: &str, password_hash: &str) -> StoreResult<User> {
        let client = self.client().await?;
        let result = client
            .query_one(
                &format!(
                    "INSERT INTO users (id, email, password) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
                ),
                &[&id, &email, &password_hash],
            )
            .await;

        match result {
            Ok(row) => User::from_row(&row).map_err(row_error),
            Err(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION) => {
                Err(StoreError::UniqueViolation(format!("users.email = {email}")))
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to insert user").into()),
        }
    }
}
