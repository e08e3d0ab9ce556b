use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::OnceCell;
use tracing::info;

use crate::config;
use crate::database::StoreError;

static POOL: OnceCell<PgPool> = OnceCell::const_new();

/// Process-wide connection pool, created lazily from DATABASE_URL.
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn pool() -> Result<PgPool, StoreError> {
        POOL.get_or_try_init(Self::connect).await.cloned()
    }

    async fn connect() -> Result<PgPool, StoreError> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| StoreError::ConfigMissing("DATABASE_URL"))?;

        let db = &config::config().database;
        let pool = PgPoolOptions::new()
            .max_connections(db.max_connections)
            .acquire_timeout(Duration::from_secs(db.connection_timeout_secs))
            .connect(&url)
            .await?;

        info!("Created database pool");
        Ok(pool)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), StoreError> {
        let pool = Self::pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }
}
