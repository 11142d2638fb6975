//! Database migration command.
//!
//! Applies the server's embedded migrations. Safe to run repeatedly; already
//! applied migrations are skipped.

use bistro_server::db::MIGRATOR;

/// Apply schema migrations.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::open_pool().await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;
    tracing::info!("Migrations complete");

    #[allow(clippy::print_stdout)]
    {
        println!("Migrations applied.");
    }
    Ok(())
}
