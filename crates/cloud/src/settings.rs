//! Publisher selection from environment variables.

use std::path::PathBuf;
use std::sync::Arc;

use depot_core::ports::AssetPublisher;

use crate::{LocalDirPublisher, S3Publisher};

/// Invalid or missing configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be set")]
    Missing { var: &'static str },

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Which publisher to build, with its settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublisherBackend {
    Local {
        dir: PathBuf,
        base_url: String,
    },
    S3 {
        bucket: String,
        key_prefix: String,
        public_base_url: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherSettings {
    pub backend: PublisherBackend,
}

impl PublisherSettings {
    /// Load publisher settings from environment variables.
    ///
    /// | Env Var              | Default                              |
    /// |----------------------|--------------------------------------|
    /// | `PUBLISHER_BACKEND`  | `local` (`local` or `s3`)            |
    /// | `PUBLISH_DIR`        | `./published`                        |
    /// | `PUBLISH_BASE_URL`   | `http://localhost:3000/published`    |
    /// | `S3_BUCKET`          | required for `s3`                    |
    /// | `S3_KEY_PREFIX`      | empty                                |
    /// | `S3_PUBLIC_BASE_URL` | `https://{bucket}.s3.amazonaws.com`  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let backend_name = var("PUBLISHER_BACKEND").unwrap_or_else(|| "local".into());
        let backend = match backend_name.trim().to_ascii_lowercase().as_str() {
            "local" => PublisherBackend::Local {
                dir: PathBuf::from(var("PUBLISH_DIR").unwrap_or_else(|| "./published".into())),
                base_url: var("PUBLISH_BASE_URL")
                    .unwrap_or_else(|| "http://localhost:3000/published".into()),
            },
            "s3" => {
                let bucket = var("S3_BUCKET").ok_or(ConfigError::Missing { var: "S3_BUCKET" })?;
                let public_base_url = var("S3_PUBLIC_BASE_URL")
                    .unwrap_or_else(|| format!("https://{bucket}.s3.amazonaws.com"));
                PublisherBackend::S3 {
                    key_prefix: var("S3_KEY_PREFIX").unwrap_or_default(),
                    bucket,
                    public_base_url,
                }
            }
            _ => {
                return Err(ConfigError::Invalid {
                    var: "PUBLISHER_BACKEND",
                    value: backend_name,
                    reason: "expected 'local' or 's3'".into(),
                })
            }
        };

        Ok(Self { backend })
    }

    /// Directory to serve over HTTP, when publishing locally.
    pub fn serve_dir(&self) -> Option<&PathBuf> {
        match &self.backend {
            PublisherBackend::Local { dir, .. } => Some(dir),
            PublisherBackend::S3 { .. } => None,
        }
    }

    /// Construct the configured publisher.
    pub async fn build(&self) -> Arc<dyn AssetPublisher> {
        match &self.backend {
            PublisherBackend::Local { dir, base_url } => {
                tracing::info!(dir = %dir.display(), %base_url, "Publishing to local directory");
                Arc::new(LocalDirPublisher::new(dir.clone(), base_url.clone()))
            }
            PublisherBackend::S3 {
                bucket,
                key_prefix,
                public_base_url,
            } => {
                tracing::info!(%bucket, %key_prefix, "Publishing to S3");
                Arc::new(
                    S3Publisher::from_env(bucket.clone(), key_prefix.clone(), public_base_url.clone())
                        .await,
                )
            }
        }
    }
}
