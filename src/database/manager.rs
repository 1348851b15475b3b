use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::{DatabaseConfig, StoreBackend};
use crate::database::memory::MemoryStore;
use crate::database::postgres::PgStore;
use crate::database::store::RecordStore;

/// Errors from the record store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    /// A unique constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A foreign key pointed at a row that does not exist
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds the store handle the API is wired with
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect the configured backend and hand back a shareable store
    pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn RecordStore>, DatabaseError> {
        match config.backend {
            StoreBackend::Memory => {
                info!("Using in-memory record store");
                Ok(Arc::new(MemoryStore::new()))
            }
            StoreBackend::Postgres => {
                let pool = Self::pool(config).await?;
                if config.run_migrations {
                    Self::migrate(&pool).await?;
                }
                Ok(Arc::new(PgStore::new(pool)))
            }
        }
    }

    /// Open a PostgreSQL pool from DATABASE_URL
    pub async fn pool(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(pool)
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn postgres_backend_requires_url() {
        let config = DatabaseConfig {
            backend: StoreBackend::Postgres,
            url: None,
            max_connections: 1,
            connection_timeout: 1,
            run_migrations: false,
        };
        let result = DatabaseManager::connect(&config).await;
        assert!(matches!(result, Err(DatabaseError::ConfigMissing("DATABASE_URL"))));
    }

    #[tokio::test]
    async fn memory_backend_is_healthy() {
        let config = DatabaseConfig {
            backend: StoreBackend::Memory,
            url: None,
            max_connections: 1,
            connection_timeout: 1,
            run_migrations: false,
        };
        let store = DatabaseManager::connect(&config).await.unwrap();
        store.ping().await.unwrap();
    }
}
