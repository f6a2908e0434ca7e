//! [`AssetStore`] backed by PostgreSQL.

use async_trait::async_trait;
use depot_core::asset::Asset;
use depot_core::error::{CoreError, StoreError};
use depot_core::ports::AssetStore;
use depot_core::search::AssetQuery;

use crate::models::asset::{AssetRow, AssetValues};
use crate::repositories::asset_repo::UQ_EXTERNAL_ID;
use crate::repositories::AssetRepo;
use crate::DbPool;

/// PostgreSQL-backed asset metadata store.
#[derive(Clone)]
pub struct PgAssetStore {
    pool: DbPool,
}

impl PgAssetStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl AssetStore for PgAssetStore {
    async fn create(&self, asset: &Asset) -> Result<Asset, StoreError> {
        let values = AssetValues::from_asset(asset).map_err(invalid_record)?;
        match AssetRepo::create(&self.pool, &values).await {
            Ok(row) => to_asset(row),
            Err(err) if is_unique_violation(&err, UQ_EXTERNAL_ID) => {
                Err(StoreError::DuplicateIdentity(asset.id().clone()))
            }
            Err(err) => Err(backend(err)),
        }
    }

    async fn replace(&self, asset: &Asset) -> Result<Asset, StoreError> {
        let values = AssetValues::from_asset(asset).map_err(invalid_record)?;
        AssetRepo::replace_pending(&self.pool, &values)
            .await
            .map_err(backend)?
            .ok_or_else(|| StoreError::NotPending(asset.id().clone()))
            .and_then(to_asset)
    }

    async fn find(&self, query: &AssetQuery) -> Result<Vec<Asset>, StoreError> {
        AssetRepo::find(&self.pool, query)
            .await
            .map_err(backend)?
            .into_iter()
            .map(to_asset)
            .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await.map_err(backend)
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// PostgreSQL unique constraint violation on the named constraint (23505).
fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505") && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    tracing::error!(error = %err, "Asset store query failed");
    StoreError::Backend(err.to_string())
}

fn invalid_record(err: CoreError) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn to_asset(row: AssetRow) -> Result<Asset, StoreError> {
    Asset::try_from(row).map_err(|err| {
        tracing::error!(error = %err, "Stored asset row is not a valid asset");
        invalid_record(err)
    })
}
