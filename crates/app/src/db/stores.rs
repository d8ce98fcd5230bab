//! `PostgreSQL` store repository.

use async_trait::async_trait;
use orderman_core::{StoreHash, StoreId};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use tracing::instrument;

use super::{RepositoryError, StoreRepository, check_access_token};
use crate::models::Store;

/// Internal row type for `PostgreSQL` queries.
#[derive(sqlx::FromRow)]
struct StoreRow {
    id: StoreId,
    store_hash: String,
    access_token: String,
    scope: String,
}

impl TryFrom<StoreRow> for Store {
    type Error = RepositoryError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        let store_hash = StoreHash::parse(&row.store_hash).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid store hash in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            store_hash,
            access_token: SecretString::from(row.access_token),
            scope: row.scope,
        })
    }
}

/// Store repository backed by the `stores` table.
#[derive(Clone)]
pub struct PgStoreRepository {
    pool: PgPool,
}

impl PgStoreRepository {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreRepository for PgStoreRepository {
    #[instrument(skip(self))]
    async fn get_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(
            r"
            SELECT id, store_hash, access_token, scope
            FROM stores
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Store::try_from).transpose()
    }

    #[instrument(skip(self), fields(store_hash = %store_hash))]
    async fn get_by_store_hash(
        &self,
        store_hash: &StoreHash,
    ) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(
            r"
            SELECT id, store_hash, access_token, scope
            FROM stores
            WHERE store_hash = $1
            ",
        )
        .bind(store_hash)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Store::try_from).transpose()
    }

    #[instrument(skip(self, access_token), fields(store_hash = %store_hash))]
    async fn upsert(
        &self,
        store_hash: &StoreHash,
        access_token: &SecretString,
        scope: &str,
    ) -> Result<Store, RepositoryError> {
        check_access_token(access_token)?;

        let row = sqlx::query_as::<_, StoreRow>(
            r"
            INSERT INTO stores (store_hash, access_token, scope)
            VALUES ($1, $2, $3)
            ON CONFLICT (store_hash) DO UPDATE SET
                access_token = EXCLUDED.access_token,
                scope = EXCLUDED.scope,
                updated_at = NOW()
            RETURNING id, store_hash, access_token, scope
            ",
        )
        .bind(store_hash)
        .bind(access_token.expose_secret())
        .bind(scope)
        .fetch_one(&self.pool)
        .await?;

        Store::try_from(row)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
