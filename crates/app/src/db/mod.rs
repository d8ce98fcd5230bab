//! Store record persistence.
//!
//! # Database
//!
//! One table, `stores`, holds a row per merchant store that has installed the
//! app. `store_hash` is unique, so re-installs update the existing row.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/app/migrations/` and run via:
//! ```bash
//! cargo run -p orderman-cli -- migrate
//! ```

pub mod memory;
pub mod stores;

use std::time::Duration;

use async_trait::async_trait;
use orderman_core::{StoreHash, StoreId};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::models::Store;
use crate::models::store::MAX_ACCESS_TOKEN_LENGTH;

pub use memory::MemoryStoreRepository;
pub use stores::PgStoreRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A value does not fit the schema.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Storage for connected stores.
///
/// Implementations must be thread-safe; a single instance is shared by all
/// request handlers.
#[async_trait]
pub trait StoreRepository: Send + Sync + 'static {
    /// Get a store by its local ID.
    async fn get_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError>;

    /// Get a store by its BigCommerce store hash.
    async fn get_by_store_hash(
        &self,
        store_hash: &StoreHash,
    ) -> Result<Option<Store>, RepositoryError>;

    /// Create the store, or replace the token and scope of an existing one.
    ///
    /// Must be atomic: concurrent calls for the same `store_hash` leave exactly
    /// one record behind.
    async fn upsert(
        &self,
        store_hash: &StoreHash,
        access_token: &SecretString,
        scope: &str,
    ) -> Result<Store, RepositoryError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Reject access tokens that would not fit the `access_token` column.
fn check_access_token(access_token: &SecretString) -> Result<(), RepositoryError> {
    let len = access_token.expose_secret().len();
    if len == 0 || len > MAX_ACCESS_TOKEN_LENGTH {
        return Err(RepositoryError::InvalidValue(format!(
            "access token must be 1-{MAX_ACCESS_TOKEN_LENGTH} characters (got {len})"
        )));
    }
    Ok(())
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
