//! Database migration command.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string, unless `--database-url`
//!   is given
//!
//! # Migration Files
//!
//! Migrations live in `crates/app/migrations/` and are embedded at compile
//! time.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Resolve the connection string from the flag or the environment.
fn database_url(flag: Option<String>) -> Result<SecretString, MigrationError> {
    let _ = dotenvy::dotenv();
    pick_database_url(flag, std::env::var("DATABASE_URL").ok())
}

/// A non-blank flag wins; otherwise the non-blank environment value.
fn pick_database_url(
    flag: Option<String>,
    env: Option<String>,
) -> Result<SecretString, MigrationError> {
    flag.filter(|url| !url.trim().is_empty())
        .or_else(|| env.filter(|url| !url.trim().is_empty()))
        .map(SecretString::from)
        .ok_or(MigrationError::MissingEnvVar("DATABASE_URL"))
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `MigrationError` if no database is configured, the connection
/// fails, or a migration fails to apply.
pub async fn run(flag: Option<String>) -> Result<(), MigrationError> {
    let database_url = database_url(flag)?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let migrator = sqlx::migrate!("../app/migrations");
    tracing::info!(count = migrator.iter().count(), "Running migrations...");
    migrator.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
