//! Database migration runner

use crate::config::Config;
use anyhow::{Context, Result};
use sqlx::mysql::MySqlPoolOptions;
use tracing::info;

/// Apply all pending migrations against the configured database.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = MySqlPoolOptions::new()
        .max_connections(1)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database for migration")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    info!("Migrations applied");
    Ok(())
}
