use crate::config::DatabaseConfig;
use crate::error::Error;
use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub mod migrations;
pub mod models;
pub mod repositories;

/// Database service for handling connections and migrations
pub struct DatabaseService {
    pub pool: Arc<SqlitePool>,
}

impl DatabaseService {
    /// Open (creating if needed) the SQLite file and bring the schema up to date
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!("Initializing Database service at {:?}", config.path);

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await
            .map_err(|e| Error::Database(format!("Failed to open database: {}", e)))?;

        info!("Opened SQLite database");

        let service = Self {
            pool: Arc::new(pool),
        };
        service.run_migrations().await?;

        Ok(service)
    }

    /// Private in-memory database. One connection that is never recycled, so the data
    /// lives as long as the service.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| Error::Database(format!("Failed to open in-memory database: {}", e)))?;

        let service = Self {
            pool: Arc::new(pool),
        };
        service.run_migrations().await?;

        Ok(service)
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations");

        migrations::run_migrations(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to run migrations: {}", e)))?;

        info!("Database migrations completed successfully");

        Ok(())
    }

    /// Health check for database
    pub async fn health_check(&self) -> Result<bool> {
        match sqlx::query("SELECT 1").execute(&*self.pool).await {
            Ok(_) => Ok(true),
            Err(e) => {
                error!("Database health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{NewOpenEvent, OpenFilter};
    use crate::db::repositories::opens::OpensRepository;

    #[tokio::test]
    async fn file_database_is_created_and_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("events.db"),
            max_connections: 2,
        };

        {
            let db = DatabaseService::new(&config).await.unwrap();
            assert!(db.health_check().await.unwrap());
            let repo = OpensRepository::new(db.pool.clone());
            repo.append(&NewOpenEvent::received_now(
                "persisted".into(),
                "10.1.1.1".into(),
                None,
                String::new(),
                String::new(),
            ))
            .await
            .unwrap();
            db.pool.close().await;
        }

        assert!(config.path.exists());

        let db = DatabaseService::new(&config).await.unwrap();
        let events = OpensRepository::new(db.pool.clone())
            .list(&OpenFilter::default())
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].subject_id, "persisted");
    }
}
