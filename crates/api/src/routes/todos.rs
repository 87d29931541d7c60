//! To-do endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::todo::{CreateTodoRequest, ListTodosQuery, ListTodosResponse, UpdateTodoRequest};
use domain::models::Todo;
use persistence::repositories::TodoRepository;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

fn not_found() -> ApiError {
    ApiError::NotFound("Todo not found".to_string())
}

/// POST /api/v1/todos
pub async fn create_todo(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    request.validate()?;
    let todo = TodoRepository::new(state.pool.clone())
        .create(auth.user_id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// GET /api/v1/todos
pub async fn list_todos(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<ListTodosQuery>,
) -> Result<Json<ListTodosResponse>, ApiError> {
    let todos = TodoRepository::new(state.pool.clone())
        .list(auth.user_id, &query)
        .await?;
    Ok(Json(ListTodosResponse {
        total: todos.len(),
        todos,
    }))
}

/// PUT /api/v1/todos/:id
pub async fn update_todo(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTodoRequest>,
) -> Result<Json<Todo>, ApiError> {
    request.validate()?;
    TodoRepository::new(state.pool.clone())
        .update(auth.user_id, id, &request)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// PATCH /api/v1/todos/:id/toggle
pub async fn toggle_todo(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Todo>, ApiError> {
    TodoRepository::new(state.pool.clone())
        .toggle(auth.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// DELETE /api/v1/todos/:id
pub async fn delete_todo(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !TodoRepository::new(state.pool.clone())
        .delete(auth.user_id, id)
        .await?
    {
        return Err(not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
