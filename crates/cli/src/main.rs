//! Orderman CLI - Database migrations.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations to DATABASE_URL
//! orderman-cli migrate
//!
//! # Apply them to another database
//! orderman-cli migrate --database-url postgres://localhost/orderman_test
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "orderman-cli")]
#[command(author, version, about = "Orderman CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        /// Connection string (defaults to `DATABASE_URL`)
        #[arg(long)]
        database_url: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::migrate::MigrationError> {
    match cli.command {
        Commands::Migrate { database_url } => commands::migrate::run(database_url).await,
    }
}
