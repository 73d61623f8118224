use async_trait::async_trait;
use super::context::Context;
use super::error::RepoResult;
use super::todo::{Todo, TodoId, UpdateTodo};

#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    /// `Ok(None)` when no row has this id; a missing row is not an error.
    async fn find_one(&self, ctx: &Context, id: TodoId) -> RepoResult<Option<Todo>>;
    async fn find_all(&self, ctx: &Context) -> RepoResult<Vec<Todo>>;
    /// Ignores `todo.id` and returns the todo carrying the store-assigned id.
    async fn create(&self, ctx: &Context, todo: Todo) -> RepoResult<Todo>;
    /// Fails with `RepoError::NotFound` when the row does not exist.
    async fn edit(&self, ctx: &Context, id: TodoId, update: UpdateTodo) -> RepoResult<Todo>;
    async fn delete(&self, ctx: &Context, id: TodoId) -> RepoResult<()>;
    async fn prepare_database(&self, ctx: &Context, drop_table: bool, seeds: &[String]) -> RepoResult<()>;
}
