//! In-process [`AssetStore`] backed by a `HashMap`.
//!
//! Evaluates [`AssetQuery`] in memory. Used by tests and by the server's
//! `STORE_BACKEND=memory` mode.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::asset::{Asset, AssetId, AssetStatus};
use crate::error::StoreError;
use crate::ports::AssetStore;
use crate::search::AssetQuery;

#[derive(Debug, Default)]
pub struct InMemoryAssetStore {
    assets: RwLock<HashMap<AssetId, Asset>>,
}

impl InMemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a single record by identifier.
    pub async fn get(&self, id: &AssetId) -> Option<Asset> {
        self.assets.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.assets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.assets.read().await.is_empty()
    }
}

#[async_trait]
impl AssetStore for InMemoryAssetStore {
    async fn create(&self, asset: &Asset) -> Result<Asset, StoreError> {
        let mut assets = self.assets.write().await;
        if assets.contains_key(asset.id()) {
            return Err(StoreError::DuplicateIdentity(asset.id().clone()));
        }
        assets.insert(asset.id().clone(), asset.clone());
        Ok(asset.clone())
    }

    async fn replace(&self, asset: &Asset) -> Result<Asset, StoreError> {
        let mut assets = self.assets.write().await;
        match assets.get_mut(asset.id()) {
            Some(current)
                if current.status() == AssetStatus::Pending && current.same_identity(asset) =>
            {
                *current = asset.clone();
                Ok(asset.clone())
            }
            _ => Err(StoreError::NotPending(asset.id().clone())),
        }
    }

    async fn find(&self, query: &AssetQuery) -> Result<Vec<Asset>, StoreError> {
        let assets = self.assets.read().await;
        Ok(query.apply(assets.values().cloned()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::asset::{ContentType, FileSize, Filename, PublishedUrl};
    use crate::search::{SearchCriteria, SortDirection};

    fn pending(id: &str, minutes: i64) -> Asset {
        Asset::pending(
            AssetId::new(id),
            Filename::new(format!("{id}.png")),
            ContentType::new("image/png"),
            FileSize::from(3),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes),
        )
    }

    #[tokio::test]
    async fn create_rejects_duplicate_identity_without_overwriting() {
        let store = InMemoryAssetStore::new();
        let original = pending("a", 0);
        store.create(&original).await.unwrap();

        let impostor = pending("a", 99);
        assert_matches!(
            store.create(&impostor).await,
            Err(StoreError::DuplicateIdentity(id)) if id.as_str() == "a"
        );
        assert_eq!(store.get(original.id()).await.unwrap(), original);
    }

    #[tokio::test]
    async fn replace_moves_pending_to_terminal() {
        let store = InMemoryAssetStore::new();
        let asset = store.create(&pending("a", 0)).await.unwrap();

        let published = asset
            .mark_as_published(PublishedUrl::new("https://cdn/a").unwrap())
            .unwrap();
        store.replace(&published).await.unwrap();

        assert_eq!(store.get(asset.id()).await.unwrap(), published);
    }

    #[tokio::test]
    async fn replace_rejects_terminal_records() {
        let store = InMemoryAssetStore::new();
        let asset = store.create(&pending("a", 0)).await.unwrap();
        let failed = asset.mark_as_failed().unwrap();
        store.replace(&failed).await.unwrap();

        assert_matches!(store.replace(&failed).await, Err(StoreError::NotPending(_)));
    }

    #[tokio::test]
    async fn replace_rejects_unknown_identity() {
        let store = InMemoryAssetStore::new();
        let failed = pending("ghost", 0).mark_as_failed().unwrap();
        assert_matches!(store.replace(&failed).await, Err(StoreError::NotPending(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn find_filters_and_sorts() {
        let store = InMemoryAssetStore::new();
        for (id, minutes) in [("b", 10), ("a", 0), ("c", 20)] {
            store.create(&pending(id, minutes)).await.unwrap();
        }

        let query = AssetQuery::build(&SearchCriteria {
            sort_direction: Some(SortDirection::Desc),
            ..Default::default()
        });
        let found = store.find(&query).await.unwrap();
        let ids: Vec<_> = found.iter().map(|a| a.id().as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);

        // Unchanged store, same answer.
        assert_eq!(store.find(&query).await.unwrap(), found);
    }
}
