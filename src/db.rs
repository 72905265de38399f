//! Database module
//!
//! Pool construction and startup checks. The schema itself lives in
//! `migrations/`.

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;

use crate::config::Config;

/// Tables the service cannot run without
pub const REQUIRED_TABLES: &[&str] = &[
    "users",
    "balances",
    "payout_destinations",
    "transfer_records",
    "withdrawals",
    "topups",
];

/// Connect options with the per-statement timeout applied to every
/// pooled connection
pub fn connect_options(config: &Config) -> Result<PgConnectOptions, sqlx::Error> {
    let timeout_ms = config.statement_timeout.as_millis().to_string();
    Ok(PgConnectOptions::from_str(&config.database_url)?
        .options([("statement_timeout", timeout_ms.as_str())]))
}

/// Create the connection pool
pub async fn connect(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(connect_options(config)?)
        .await
}

/// Simple connectivity check
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for table in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    Ok(true)
}
