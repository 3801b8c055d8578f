//! Todo routes: list, get, create, partial update, delete

use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, Uri},
    routing::{MethodRouter, get},
};
use uuid::Uuid;

use crate::auth::models::AuthUser;
use crate::database::models::{CreateTodoRequest, Todo, UpdateTodoRequest};
use crate::database::update_builder::{build_update, SqlValue};
use crate::error::ApiError;
use crate::routes::{decode_json, method_not_allowed};
use crate::server::AppState;

/// The id is the last segment of `/todos/...`; anything else is a bad id.
fn parse_todo_id(path: &str) -> Result<Uuid, ApiError> {
    path.trim_matches('/')
        .rsplit_once('/')
        .and_then(|(_, last)| Uuid::parse_str(last).ok())
        .ok_or(ApiError::InvalidArgument("Invalid todo ID"))
}

pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state.todos.list_todos().await?;
    Ok(Json(todos))
}

pub async fn get_todo(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_todo_id(uri.path())?;

    state
        .todos
        .get_todo(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Todo not found"))
}

pub async fn create_todo(
    State(state): State<AppState>,
    user: Option<Extension<AuthUser>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let req: CreateTodoRequest = decode_json(&body)?;
    let text = req.todo.unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ApiError::InvalidArgument("Todo text is required"));
    }

    let todo = state.todos.create_todo(&text).await?;
    match user {
        Some(Extension(user)) => tracing::info!("Created todo {} for {}", todo.id, user.email),
        None => tracing::info!("Created todo {}", todo.id),
    }

    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update_todo(
    State(state): State<AppState>,
    uri: Uri,
    body: Bytes,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_todo_id(uri.path())?;
    let req: UpdateTodoRequest = decode_json(&body)?;

    if req.todo.as_deref().is_some_and(|text| text.trim().is_empty()) {
        return Err(ApiError::InvalidArgument("Todo text cannot be empty"));
    }

    let update = build_update(
        "todos",
        vec![
            ("todo", req.todo.map(SqlValue::Text)),
            ("completed", req.completed.map(SqlValue::Bool)),
        ],
    )?
    .touching("updated_at");

    let todo = state
        .todos
        .update_todo(id, &update)
        .await?
        .ok_or(ApiError::NotFound("Todo not found"))?;

    Ok(Json(todo))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<StatusCode, ApiError> {
    let id = parse_todo_id(uri.path())?;

    if !state.todos.delete_todo(id).await? {
        return Err(ApiError::NotFound("Todo not found"));
    }

    tracing::info!("Deleted todo {}", id);
    Ok(StatusCode::NO_CONTENT)
}

fn todo_item_routes() -> MethodRouter<AppState> {
    get(get_todo)
        .put(update_todo)
        .delete(delete_todo)
        .fallback(method_not_allowed)
}

pub fn create_todo_routes() -> Router<AppState> {
    // every path under /todos/ reaches the item handlers so malformed ids get a 400
    Router::new()
        .route(
            "/todos",
            get(list_todos).post(create_todo).fallback(method_not_allowed),
        )
        .route("/todos/", todo_item_routes())
        .route("/todos/{*rest}", todo_item_routes())
}
