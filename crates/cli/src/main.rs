//! Bistro CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply schema migrations
//! bistro-cli migrate
//!
//! # Load a catalog fixture
//! bistro-cli seed --file fixtures/catalog.yaml
//!
//! # Create a user and put them in a staff group
//! bistro-cli user create --username maria --email maria@example.com --group Manager
//! bistro-cli user add-to-group --username joe --group delivery-crew
//! bistro-cli user remove-from-group --username joe --group delivery-crew
//!
//! # Issue an auth token (printed once, store it safely)
//! bistro-cli token issue --username maria
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use bistro_core::types::StaffGroup;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bistro-cli")]
#[command(author, version, about = "Bistro CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database schema migrations
    Migrate,
    /// Seed categories and menu items from a YAML fixture
    Seed {
        /// Path to the fixture file
        #[arg(short, long)]
        file: String,
    },
    /// Manage user accounts and staff group membership
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage auth tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, default_value = "")]
        email: String,

        /// Staff group to attach the user to (`Manager`, `delivery-crew`)
        #[arg(short, long)]
        group: Option<StaffGroup>,
    },
    /// Add an existing user to a staff group
    AddToGroup {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        group: StaffGroup,
    },
    /// Remove a user from a staff group
    RemoveFromGroup {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        group: StaffGroup,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Generate and store a new auth token for a user
    Issue {
        #[arg(short, long)]
        username: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::run(&file).await?,
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                email,
                group,
            } => commands::user::create(&username, &email, group).await?,
            UserAction::AddToGroup { username, group } => {
                commands::user::add_to_group(&username, group).await?;
            }
            UserAction::RemoveFromGroup { username, group } => {
                commands::user::remove_from_group(&username, group).await?;
            }
        },
        Commands::Token { action } => match action {
            TokenAction::Issue { username } => commands::token::issue(&username).await?,
        },
    }
    Ok(())
}
