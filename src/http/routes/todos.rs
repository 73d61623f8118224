use std::time::Duration;

use axum::{extract::{Path, State}, routing::{get, post}, Json, Router};
use http::StatusCode;

use crate::domain::{context::Context, repository::TodoRepository, todo::{Todo, TodoId, UpdateTodo}};
use crate::http::types::ApiError;

#[derive(Clone)]
pub struct AppState<R: TodoRepository> {
    pub repo: R,
    pub request_timeout: Duration,
}

impl<R: TodoRepository> AppState<R> {
    fn context(&self) -> Context { Context::background().with_timeout(self.request_timeout) }
}

pub fn router<R: TodoRepository + Clone>(state: AppState<R>) -> Router {
    Router::new()
        .route("/todos", post(create_todo::<R>).get(list_todos::<R>))
        .route("/todos/:id", get(get_todo::<R>).patch(edit_todo::<R>).put(edit_todo::<R>).delete(delete_todo::<R>))
        .with_state(state)
}

async fn create_todo<R: TodoRepository>(State(state): State<AppState<R>>, Json(payload): Json<Todo>) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let todo = state.repo.create(&state.context(), payload).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn list_todos<R: TodoRepository>(State(state): State<AppState<R>>) -> Result<Json<serde_json::Value>, ApiError> {
    let todos = state.repo.find_all(&state.context()).await?;
    Ok(Json(serde_json::json!({ "items": todos })))
}

async fn get_todo<R: TodoRepository>(State(state): State<AppState<R>>, Path(id): Path<String>) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id)?;
    match state.repo.find_one(&state.context(), id).await? {
        Some(todo) => Ok(Json(todo)),
        None => Err(ApiError::not_found()),
    }
}

async fn edit_todo<R: TodoRepository>(State(state): State<AppState<R>>, Path(id): Path<String>, Json(payload): Json<UpdateTodo>) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id)?;
    let todo = state.repo.edit(&state.context(), id, payload).await?;
    Ok(Json(todo))
}

async fn delete_todo<R: TodoRepository>(State(state): State<AppState<R>>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.repo.delete(&state.context(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(s: &str) -> Result<TodoId, ApiError> {
    s.parse::<i64>().map(TodoId).map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "invalid id"))
}
