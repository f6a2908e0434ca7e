//! Publisher that copies content into a local directory.
//!
//! The directory is expected to be served over HTTP at `base_url` (the API
//! mounts it with `ServeDir` when this backend is active).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use depot_core::asset::{Asset, PublishedUrl};
use depot_core::error::PublishError;
use depot_core::ports::AssetPublisher;

use crate::{object_key, public_url};

pub struct LocalDirPublisher {
    root: PathBuf,
    base_url: String,
}

impl LocalDirPublisher {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl AssetPublisher for LocalDirPublisher {
    async fn publish(&self, asset: &Asset, content: &[u8]) -> Result<PublishedUrl, PublishError> {
        let key = object_key(asset);
        let path = self.root.join(&key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, content).await?;

        tracing::debug!(
            asset_id = %asset.id(),
            path = %path.display(),
            bytes = content.len(),
            "Wrote asset content to publish directory",
        );

        PublishedUrl::new(public_url(&self.base_url, &key))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;
    use depot_core::asset::{AssetId, ContentType, FileSize, Filename};

    use super::*;

    fn asset(id: &str, filename: &str) -> Asset {
        Asset::pending(
            AssetId::new(id),
            Filename::new(filename),
            ContentType::new("image/png"),
            FileSize::from(3),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn writes_content_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = LocalDirPublisher::new(dir.path(), "http://localhost:3000/published/");

        let url = publisher
            .publish(&asset("id-1", "my panda.png"), b"abc")
            .await
            .unwrap();

        assert_eq!(
            url.as_str(),
            "http://localhost:3000/published/id-1/my_panda.png"
        );
        let written = std::fs::read(dir.path().join("id-1").join("my_panda.png")).unwrap();
        assert_eq!(written, b"abc");
    }

    #[tokio::test]
    async fn empty_base_url_still_yields_a_url() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = LocalDirPublisher::new(dir.path(), "");
        let url = publisher.publish(&asset("id-2", "a.png"), b"x").await.unwrap();
        assert_eq!(url.as_str(), "/id-2/a.png");
    }

    #[tokio::test]
    async fn unwritable_root_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();

        let publisher = LocalDirPublisher::new(&blocker, "http://localhost");
        let result = publisher.publish(&asset("id-3", "a.png"), b"x").await;
        assert_matches!(result, Err(PublishError::Io(_)));
    }
}
