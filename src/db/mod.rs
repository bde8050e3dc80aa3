//! Database initialization and migration runner.
//!
//! SYSTEM CONTEXT
//! ==============
//! The chat log is the only durable store. Several processes may point at
//! the same SQLite file, so connections wait on the write lock instead of
//! failing, and `AUTOINCREMENT` keeps ids unique and strictly increasing
//! across all of them.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::consts::DB_BUSY_TIMEOUT_MS;

/// Initialize the SQLite connection pool and run migrations.
///
/// # Errors
///
/// Returns an error if the URL is invalid, the file cannot be opened, or a
/// migration fails.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(DB_BUSY_TIMEOUT_MS));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await?;

    migrate(&pool).await?;

    Ok(pool)
}

/// Run the embedded migrations against an existing pool.
///
/// # Errors
///
/// Returns an error if a migration fails.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("src/db/migrations").run(pool).await?;
    Ok(())
}
