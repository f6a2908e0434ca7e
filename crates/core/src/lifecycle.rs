//! Asset lifecycle coordinator: upload, then publish in the background.
//!
//! ```text
//! PENDING --publish ok-----> PUBLISHED
//! PENDING --publish error--> FAILED
//! ```
//!
//! Only the synchronous part of an upload (validation and the pending
//! persist) reports errors to the caller. Once the identifier is returned,
//! every failure is terminal to the background task and is visible only in
//! logs and in the record's eventual status. A single publish attempt is
//! authoritative; nothing is retried.

use std::sync::Arc;

use tokio_util::task::TaskTracker;

use crate::asset::{Asset, AssetId, ContentType, FileSize, Filename};
use crate::error::{CoreError, StoreError};
use crate::ports::{AssetPublisher, AssetStore, Clock, IdGenerator, SystemClock, UuidGenerator};
use crate::search::{AssetQuery, SearchCriteria};
use crate::validation::{AssetValidator, DefaultAssetValidator};

/// Log field value marking published content whose metadata still says
/// `PENDING`.
pub const INCONSISTENCY_PUBLISHED_NOT_RECORDED: &str = "published_not_recorded";

// ---------------------------------------------------------------------------
// Commands & results
// ---------------------------------------------------------------------------

/// Input to [`AssetService::upload`].
#[derive(Debug, Clone)]
pub struct AssetUploadCommand {
    pub filename: String,
    pub content_type: String,
    /// Declared size in bytes. Negative values are rejected.
    pub size: i64,
    pub content: Vec<u8>,
}

/// Acknowledgment returned once the pending record is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUploadResult {
    pub asset_id: AssetId,
}

/// How a background publish task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Content published and the record replaced with `PUBLISHED`.
    Published,
    /// Publisher failed and the record replaced with `FAILED`.
    Failed,
    /// Content published but the `PUBLISHED` record could not be stored.
    PublishedNotRecorded,
    /// Publisher failed and the `FAILED` record could not be stored either.
    FailureNotRecorded,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Coordinates uploads, background publishing and search.
///
/// Cheap to clone: ports are behind `Arc` and the task tracker is shared.
#[derive(Clone)]
pub struct AssetService {
    store: Arc<dyn AssetStore>,
    publisher: Arc<dyn AssetPublisher>,
    validator: Arc<dyn AssetValidator>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    tasks: TaskTracker,
}

impl AssetService {
    /// Build a service with the default validator, system clock and UUIDs.
    pub fn new(store: Arc<dyn AssetStore>, publisher: Arc<dyn AssetPublisher>) -> Self {
        Self {
            store,
            publisher,
            validator: Arc::new(DefaultAssetValidator),
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidGenerator),
            tasks: TaskTracker::new(),
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn AssetValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Record an upload as `PENDING` and schedule its publication.
    ///
    /// Returns as soon as the pending record is stored; the caller never
    /// waits for the publisher. Validation and store errors are returned
    /// unchanged and nothing is scheduled.
    ///
    /// The persist and the scheduling run together in a tracked task, so
    /// dropping the returned future (client disconnect, request timeout)
    /// cannot leave a stored record without a publish task.
    pub async fn upload(&self, command: AssetUploadCommand) -> Result<AssetUploadResult, CoreError> {
        let AssetUploadCommand {
            filename,
            content_type,
            size,
            content,
        } = command;

        let asset = Asset::pending(
            self.ids.generate(),
            Filename::new(filename),
            ContentType::new(content_type),
            FileSize::try_from(size)?,
            self.clock.now(),
        );
        self.validator.validate(&asset)?;

        let persisted = self.tasks.spawn(persist_and_schedule(
            Arc::clone(&self.store),
            Arc::clone(&self.publisher),
            self.tasks.clone(),
            asset,
            content,
        ));

        let asset_id = persisted.await.map_err(|e| {
            CoreError::Store(StoreError::Backend(format!("Upload task failed: {e}")))
        })??;

        Ok(AssetUploadResult { asset_id })
    }

    /// Return the assets matching `criteria`, ordered by upload date.
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Asset>, CoreError> {
        let query = AssetQuery::build(criteria);
        Ok(self.store.find(&query).await?)
    }

    /// Whether the metadata store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.store.ping().await.is_ok()
    }

    /// Number of publish tasks still running.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every in-flight publish task to finish.
    ///
    /// Uploads accepted afterwards still spawn tasks, but this call will not
    /// wait for them.
    pub async fn shutdown(&self) {
        self.tasks.close();
        self.tasks.wait().await;
    }
}

// ---------------------------------------------------------------------------
// Background tasks
// ---------------------------------------------------------------------------

/// Store the pending record and, only if that succeeds, spawn its publish.
async fn persist_and_schedule(
    store: Arc<dyn AssetStore>,
    publisher: Arc<dyn AssetPublisher>,
    tasks: TaskTracker,
    asset: Asset,
    content: Vec<u8>,
) -> Result<AssetId, StoreError> {
    let saved = store.create(&asset).await?;
    tracing::info!(
        asset_id = %saved.id(),
        filename = %saved.filename().as_str(),
        "Asset info stored",
    );

    let asset_id = saved.id().clone();
    tasks.spawn(publish_and_record(store, publisher, saved, content));
    Ok(asset_id)
}

/// Publish `asset` and persist its terminal state. Never retries.
pub(crate) async fn publish_and_record(
    store: Arc<dyn AssetStore>,
    publisher: Arc<dyn AssetPublisher>,
    asset: Asset,
    content: Vec<u8>,
) -> PublishOutcome {
    match publisher.publish(&asset, &content).await {
        Ok(url) => {
            tracing::info!(
                asset_id = %asset.id(),
                url = %url,
                "Asset published successfully",
            );
            match record(store.as_ref(), asset.mark_as_published(url)).await {
                Ok(()) => {
                    tracing::info!(asset_id = %asset.id(), "Asset marked as published");
                    PublishOutcome::Published
                }
                Err(e) => {
                    tracing::error!(
                        asset_id = %asset.id(),
                        inconsistency = INCONSISTENCY_PUBLISHED_NOT_RECORDED,
                        error = %e,
                        "CRITICAL: asset was published but its metadata was not updated",
                    );
                    PublishOutcome::PublishedNotRecorded
                }
            }
        }
        Err(publish_err) => {
            tracing::error!(
                asset_id = %asset.id(),
                error = %publish_err,
                "Asset failed to publish",
            );
            match record(store.as_ref(), asset.mark_as_failed()).await {
                Ok(()) => {
                    tracing::info!(asset_id = %asset.id(), "Asset marked as failed");
                    PublishOutcome::Failed
                }
                Err(e) => {
                    tracing::error!(
                        asset_id = %asset.id(),
                        error = %e,
                        "Asset publish failure could not be recorded; record stays PENDING",
                    );
                    PublishOutcome::FailureNotRecorded
                }
            }
        }
    }
}

/// Replace the stored record with a terminal value.
async fn record(
    store: &dyn AssetStore,
    terminal: Result<Asset, CoreError>,
) -> Result<(), CoreError> {
    store.replace(&terminal?).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
