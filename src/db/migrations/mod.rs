use anyhow::Result;
use sqlx::{Executor, SqlitePool};
use tracing::info;

/// Embedded migrations, applied in order. Every script must be idempotent.
const MIGRATIONS: &[(&str, &str)] = &[(
    "001_create_opens.sql",
    include_str!("sql/001_create_opens.sql"),
)];

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    for (name, sql) in MIGRATIONS {
        pool.execute(*sql).await?;
        info!("Applied migration: {}", name);
    }

    Ok(())
}
