//! Postgres persistence.
//!
//! Each submodule owns one table and exposes free functions over a `PgExecutor`, so the same
//! query runs against the pool or inside a transaction (`&mut *tx`).

pub mod categories;
pub mod laundries;
pub mod otps;
pub mod users;

use log::info;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::Config;

/// Connects the pool and applies the embedded migrations.
pub async fn connect(config: &Config) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await?;
    info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied");

    Ok(pool)
}
