use todo_store::{
    config::Config,
    domain::{context::Context, repository::TodoRepository},
    http::routing::{self, todos},
    infrastructure::sqlite_repo::SqliteTodoRepository,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    let repo = SqliteTodoRepository::connect(&config.database_url, config.max_connections).await?;
    repo.prepare_database(&Context::background(), config.reset_database, &config.seeds).await?;
    tracing::info!(reset = config.reset_database, seeds = config.seeds.len(), "database ready");

    let router = routing::app(todos::AppState { repo, request_timeout: config.request_timeout });

    let addr = config.bind_addr;
    tracing::info!(%addr, "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}
