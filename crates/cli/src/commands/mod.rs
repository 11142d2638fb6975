//! CLI subcommand implementations.

use bistro_server::config::ServerConfig;
use bistro_server::db;
use sqlx::SqlitePool;

pub mod migrate;
pub mod seed;
pub mod token;
pub mod user;

/// Open the pool the way the server does, from the same environment.
pub(crate) async fn open_pool() -> Result<SqlitePool, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = ServerConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    Ok(pool)
}
