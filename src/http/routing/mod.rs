use axum::{routing::get, Router};

use crate::domain::repository::TodoRepository;

pub use super::routes::todos;

/// Full application router: liveness probe plus the todo routes.
pub fn app<R: TodoRepository + Clone>(state: todos::AppState<R>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(todos::router(state))
}

async fn health() -> &'static str { "ok" }
