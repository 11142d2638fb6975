//! Database access layer.
//!
//! Repositories borrow the shared [`sqlx::SqlitePool`] and map rows into the
//! domain models in [`crate::models`]. Money columns are stored as
//! two-decimal text and converted at the row boundary.

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

pub mod cart;
pub mod catalog;
pub mod orders;
pub mod users;

pub use cart::CartRepository;
pub use catalog::{CategoryRepository, MenuItemRepository};
pub use orders::OrderRepository;
pub use users::UserRepository;

/// Embedded schema migrations, applied by the CLI `migrate` command.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Data corruption: {0}")]
    DataCorruption(String),
    #[error("Resource not found")]
    NotFound,
    #[error("Resource conflict: {0}")]
    Conflict(String),
}

/// Create a database connection pool.
///
/// # Errors
///
/// Returns an error if the URL is malformed or the database cannot be opened.
pub async fn create_pool(database_url: &SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Substring-match pattern for `LIKE ... ESCAPE '\'`, with any wildcards in
/// the needle escaped.
pub(crate) fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Single-connection in-memory pool with migrations applied, for unit tests.
///
/// One connection keeps every query on the same in-memory database.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    MIGRATOR.run(&pool).await.unwrap();
    pool
}
