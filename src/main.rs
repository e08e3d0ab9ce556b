use anyhow::Context;
use quizdeck_api::database::manager::DatabaseManager;
use quizdeck_api::{app, config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting QuizDeck API in {:?} mode", config.environment);

    // Bring the schema up to date. A missing database is not fatal here;
    // /health will keep reporting degraded until one appears.
    match DatabaseManager::pool().await {
        Ok(pool) => {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("failed to run database migrations")?;
        }
        Err(e) => tracing::warn!("database unavailable at startup: {}", e),
    }

    // Allow tests or deployments to override port via env
    let port = std::env::var("QUIZDECK_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("QuizDeck API listening on http://{}", bind_addr);
    axum::serve(listener, app()).await?;

    Ok(())
}
