//! In-memory stores for handler tests

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{Todo, User};
use crate::database::store::{StoreError, StoreResult, TodoStore, UserStore};
use crate::database::update_builder::{SqlValue, UpdateStatement};

#[derive(Default)]
pub struct MemoryStore {
    todos: RwLock<Vec<Todo>>,
    users: RwLock<HashMap<String, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list_todos(&self) -> StoreResult<Vec<Todo>> {
        let mut todos: Vec<Todo> = self.todos.read().await.iter().rev().cloned().collect();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(todos)
    }

    async fn get_todo(&self, id: Uuid) -> StoreResult<Option<Todo>> {
        Ok(self.todos.read().await.iter().find(|t| t.id == id).cloned())
    }

    async fn create_todo(&self, text: &str) -> StoreResult<Todo> {
        let now = Utc::now();
        let todo = Todo {
            id: Uuid::new_v4(),
            todo: text.to_string(),
            completed: false,
            created_at: now,
            updated_at: now,
        };
        self.todos.write().await.push(todo.clone());
        Ok(todo)
    }

    async fn update_todo(&self, id: Uuid, update: &UpdateStatement) -> StoreResult<Option<Todo>> {
        let mut todos = self.todos.write().await;
        let Some(todo) = todos.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };

        for (column, value) in update.assignments() {
            match (column, value) {
                ("todo", SqlValue::Text(text)) => todo.todo = text.clone(),
                ("completed", SqlValue::Bool(done)) => todo.completed = *done,
                (column, value) => {
                    return Err(anyhow::anyhow!("unsupported assignment {column} = {value:?}").into());
                }
            }
        }
        todo.updated_at = Utc::now();
        Ok(Some(todo.clone()))
    }

    async fn delete_todo(&self, id: Uuid) -> StoreResult<bool> {
        let mut todos = self.todos.write().await;
        let before = todos.len();
        todos.retain(|t| t.id != id);
        Ok(todos.len() != before)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn create_user(&self, id: Uuid, email: &str, password_hash: &str) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(StoreError::UniqueViolation(format!("users.email = {email}")));
        }

        let now = Utc::now();
        let user = User {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        users.insert(email.to_string(), user.clone());
        Ok(user)
    }
}
