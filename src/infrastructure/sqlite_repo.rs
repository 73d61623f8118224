use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow}, Executor, Pool, Row, Sqlite};
use tracing::{debug, info};

use crate::domain::{
    context::Context,
    error::{RepoError, RepoResult},
    repository::TodoRepository,
    todo::{Todo, TodoId, UpdateTodo},
};

/// Schema-creation script applied by `prepare_database`.
pub const SCHEMA: &str = include_str!("../../migrations/schema.sql");

const SELECT_ONE: &str = "SELECT id, completed, text FROM todos WHERE id = ?";
const SELECT_ALL: &str = "SELECT id, completed, text FROM todos";
const INSERT: &str = "INSERT INTO todos (completed, text) VALUES (?, ?)";
const UPDATE: &str = "UPDATE todos SET completed = ?, text = ? WHERE id = ?";
const DELETE: &str = "DELETE FROM todos WHERE id = ?";
const DROP_TABLE: &str = "DROP TABLE IF EXISTS todos";

#[derive(Clone)]
pub struct SqliteTodoRepository {
    pool: Arc<Pool<Sqlite>>,
    schema: Arc<str>,
}

impl SqliteTodoRepository {
    pub async fn connect(database_url: &str, max_connections: u32) -> RepoResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Each connection to an in-memory database sees its own empty database,
        // so those pools hold exactly one connection for their whole lifetime.
        let pool_options = if is_memory_url(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };
        let pool = pool_options.connect_with(options).await?;
        debug!(database_url, "connected to sqlite");
        Ok(Self::new(pool))
    }

    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool: Arc::new(pool), schema: Arc::from(SCHEMA) }
    }

    /// Replaces the schema script applied by `prepare_database`.
    pub fn with_schema(mut self, schema: impl Into<Arc<str>>) -> Self {
        self.schema = schema.into();
        self
    }
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn find_one(&self, ctx: &Context, id: TodoId) -> RepoResult<Option<Todo>> {
        debug!(%id, "find_one");
        ctx.run(fetch_by_id(&*self.pool, id)).await
    }

    async fn find_all(&self, ctx: &Context) -> RepoResult<Vec<Todo>> {
        let rows = ctx.run(sqlx::query(SELECT_ALL).fetch_all(&*self.pool)).await?;
        debug!(count = rows.len(), "find_all");
        rows.into_iter()
            .map(row_to_todo)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepoError::from)
    }

    async fn create(&self, ctx: &Context, mut todo: Todo) -> RepoResult<Todo> {
        let result = ctx
            .run(
                sqlx::query(INSERT)
                    .bind(todo.completed)
                    .bind(&todo.text)
                    .execute(&*self.pool),
            )
            .await?;
        todo.id = TodoId(result.last_insert_rowid());
        debug!(id = %todo.id, "created todo");
        Ok(todo)
    }

    async fn edit(&self, ctx: &Context, id: TodoId, update: UpdateTodo) -> RepoResult<Todo> {
        let todo = ctx.run(read_merge_write(&self.pool, id, update)).await?;
        debug!(%id, "edited todo");
        Ok(todo)
    }

    async fn delete(&self, ctx: &Context, id: TodoId) -> RepoResult<()> {
        let result = ctx.run(sqlx::query(DELETE).bind(id.0).execute(&*self.pool)).await?;
        debug!(%id, rows = result.rows_affected(), "delete");
        Ok(())
    }

    async fn prepare_database(&self, ctx: &Context, drop_table: bool, seeds: &[String]) -> RepoResult<()> {
        if drop_table {
            info!("dropping todos table");
            ctx.run(sqlx::query(DROP_TABLE).execute(&*self.pool)).await?;
        }
        ctx.run((&*self.pool).execute(&*self.schema)).await?;

        if drop_table {
            // No rollback: seeds inserted before a failure stay in place.
            for seed in seeds {
                self.create(ctx, Todo::new(seed.as_str())).await?;
            }
            info!(count = seeds.len(), "seeded todos table");
        }
        Ok(())
    }
}

// Read then write without a transaction: overlapping edits of the same id
// race and the last write wins. Edits of different ids never block each other.
async fn read_merge_write(pool: &Pool<Sqlite>, id: TodoId, update: UpdateTodo) -> RepoResult<Todo> {
    let Some(mut todo) = fetch_by_id(pool, id).await? else {
        return Err(RepoError::NotFound);
    };
    todo.apply(update);
    sqlx::query(UPDATE)
        .bind(todo.completed)
        .bind(&todo.text)
        .bind(todo.id.0)
        .execute(pool)
        .await?;
    Ok(todo)
}

async fn fetch_by_id<'e, E>(executor: E, id: TodoId) -> Result<Option<Todo>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(SELECT_ONE).bind(id.0).fetch_optional(executor).await?;
    row.map(row_to_todo).transpose()
}

fn row_to_todo(row: SqliteRow) -> Result<Todo, sqlx::Error> {
    Ok(Todo {
        id: TodoId(row.try_get("id")?),
        completed: row.try_get("completed")?,
        text: row.try_get("text")?,
    })
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}
