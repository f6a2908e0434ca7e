//! Publisher that uploads content to an S3 bucket.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use depot_core::asset::{Asset, PublishedUrl};
use depot_core::error::PublishError;
use depot_core::ports::AssetPublisher;

use crate::{object_key, public_url};

/// Uploads each asset with a single `PutObject` call.
///
/// Credentials and region come from the standard AWS provider chain
/// (`AWS_REGION`, `AWS_ACCESS_KEY_ID`, profiles, instance metadata, ...).
pub struct S3Publisher {
    client: aws_sdk_s3::Client,
    bucket: String,
    key_prefix: String,
    public_base_url: String,
}

impl S3Publisher {
    pub fn new(
        client: aws_sdk_s3::Client,
        bucket: impl Into<String>,
        key_prefix: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key_prefix: key_prefix.into(),
            public_base_url: public_base_url.into(),
        }
    }

    /// Build a client from the ambient AWS environment.
    pub async fn from_env(
        bucket: impl Into<String>,
        key_prefix: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        let sdk_config = aws_config::load_from_env().await;
        let client = aws_sdk_s3::Client::new(&sdk_config);
        Self::new(client, bucket, key_prefix, public_base_url)
    }

    /// Full key inside the bucket, including the configured prefix.
    fn key_for(&self, asset: &Asset) -> String {
        prefixed_key(&self.key_prefix, &object_key(asset))
    }
}

#[async_trait]
impl AssetPublisher for S3Publisher {
    async fn publish(&self, asset: &Asset, content: &[u8]) -> Result<PublishedUrl, PublishError> {
        let key = self.key_for(asset);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(asset.content_type().as_str())
            .body(ByteStream::from(content.to_vec()))
            .send()
            .await
            .map_err(|err| PublishError::Transport(DisplayErrorContext(&err).to_string()))?;

        tracing::debug!(
            asset_id = %asset.id(),
            bucket = %self.bucket,
            key = %key,
            "Uploaded asset content to S3",
        );

        PublishedUrl::new(public_url(&self.public_base_url, &key))
    }
}

fn prefixed_key(prefix: &str, key: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}/{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prefix_leaves_key_alone() {
        assert_eq!(prefixed_key("", "id/a.png"), "id/a.png");
        assert_eq!(prefixed_key("/", "id/a.png"), "id/a.png");
    }

    #[test]
    fn prefix_is_joined_with_one_slash() {
        assert_eq!(prefixed_key("assets/", "id/a.png"), "assets/id/a.png");
        assert_eq!(prefixed_key("/public/assets", "id/a.png"), "public/assets/id/a.png");
    }
}
