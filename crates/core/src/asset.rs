//! Asset domain model and its publish state machine.
//!
//! An [`Asset`] is an immutable value. Status transitions return a new value
//! so the upload path and the background publish task never share a mutable
//! instance.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, PublishError};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Identity value types
// ---------------------------------------------------------------------------

/// Opaque, globally unique asset identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Original filename supplied by the uploader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filename(String);

impl Filename {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// MIME content type, always stored in lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType(String);

impl ContentType {
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(value.as_ref().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Size of the uploaded content in bytes. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FileSize(u64);

impl FileSize {
    pub fn bytes(self) -> u64 {
        self.0
    }
}

impl From<u64> for FileSize {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl TryFrom<i64> for FileSize {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .map(Self)
            .map_err(|_| CoreError::Validation(format!("File size cannot be negative: {value}")))
    }
}

/// Public URL returned by a publisher. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedUrl(String);

impl PublishedUrl {
    /// Wrap a publisher-provided URL, rejecting blank values.
    pub fn new(value: impl Into<String>) -> Result<Self, PublishError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(PublishError::Rejected(
                "publisher returned an empty URL".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PublishedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Publish status, matching the `asset_statuses` seed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetStatus {
    Pending = 1,
    Published = 2,
    Failed = 3,
}

impl AssetStatus {
    /// Database lookup id.
    pub fn id(self) -> i16 {
        self as i16
    }

    /// Parse from the database lookup id.
    pub fn from_id(id: i16) -> Result<Self, CoreError> {
        match id {
            1 => Ok(Self::Pending),
            2 => Ok(Self::Published),
            3 => Ok(Self::Failed),
            other => Err(CoreError::Validation(format!(
                "Unknown asset status id {other}"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Published => "PUBLISHED",
            Self::Failed => "FAILED",
        }
    }

    /// `PUBLISHED` and `FAILED` accept no further transitions.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status and URL travel together so `PUBLISHED` can never lack a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Publication {
    Pending,
    Published(PublishedUrl),
    Failed,
}

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// A recorded upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "AssetRecord", try_from = "AssetRecord")]
pub struct Asset {
    id: AssetId,
    filename: Filename,
    content_type: ContentType,
    file_size: FileSize,
    upload_date: Timestamp,
    publication: Publication,
}

impl Asset {
    /// Build a freshly uploaded asset in the `PENDING` state.
    pub fn pending(
        id: AssetId,
        filename: Filename,
        content_type: ContentType,
        file_size: FileSize,
        upload_date: Timestamp,
    ) -> Self {
        Self {
            id,
            filename,
            content_type,
            file_size,
            upload_date,
            publication: Publication::Pending,
        }
    }

    /// Rebuild an asset from stored parts, checking the status/URL invariant.
    pub fn restore(
        id: AssetId,
        filename: Filename,
        content_type: ContentType,
        file_size: FileSize,
        upload_date: Timestamp,
        status: AssetStatus,
        published_url: Option<String>,
    ) -> Result<Self, CoreError> {
        let publication = match (status, published_url) {
            (AssetStatus::Pending, None) => Publication::Pending,
            (AssetStatus::Failed, None) => Publication::Failed,
            (AssetStatus::Published, Some(url)) => Publication::Published(
                PublishedUrl::new(url).map_err(|e| CoreError::Validation(e.to_string()))?,
            ),
            (AssetStatus::Published, None) => {
                return Err(CoreError::Validation(format!(
                    "Asset '{id}' is PUBLISHED but has no published URL"
                )));
            }
            (status, Some(_)) => {
                return Err(CoreError::Validation(format!(
                    "Asset '{id}' is {status} but carries a published URL"
                )));
            }
        };

        Ok(Self {
            id,
            filename,
            content_type,
            file_size,
            upload_date,
            publication,
        })
    }

    pub fn id(&self) -> &AssetId {
        &self.id
    }

    pub fn filename(&self) -> &Filename {
        &self.filename
    }

    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    pub fn file_size(&self) -> FileSize {
        self.file_size
    }

    pub fn upload_date(&self) -> Timestamp {
        self.upload_date
    }

    pub fn status(&self) -> AssetStatus {
        match self.publication {
            Publication::Pending => AssetStatus::Pending,
            Publication::Published(_) => AssetStatus::Published,
            Publication::Failed => AssetStatus::Failed,
        }
    }

    pub fn published_url(&self) -> Option<&PublishedUrl> {
        match &self.publication {
            Publication::Published(url) => Some(url),
            _ => None,
        }
    }

    /// True when both values describe the same upload (identity fields only).
    pub fn same_identity(&self, other: &Asset) -> bool {
        self.id == other.id
            && self.filename == other.filename
            && self.content_type == other.content_type
            && self.file_size == other.file_size
            && self.upload_date == other.upload_date
    }

    /// `PENDING -> PUBLISHED`.
    pub fn mark_as_published(&self, url: PublishedUrl) -> Result<Asset, CoreError> {
        self.transition(Publication::Published(url))
    }

    /// `PENDING -> FAILED`.
    pub fn mark_as_failed(&self) -> Result<Asset, CoreError> {
        self.transition(Publication::Failed)
    }

    fn transition(&self, next: Publication) -> Result<Asset, CoreError> {
        if self.status().is_terminal() {
            return Err(CoreError::Conflict(format!(
                "Asset '{}' is already {} and cannot transition again",
                self.id,
                self.status()
            )));
        }
        Ok(Asset {
            publication: next,
            ..self.clone()
        })
    }
}

// ---------------------------------------------------------------------------
// Flat serialized form
// ---------------------------------------------------------------------------

/// Flat representation of an [`Asset`] used for (de)serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub file_size: u64,
    pub upload_date: Timestamp,
    pub status: AssetStatus,
    pub published_url: Option<String>,
}

impl From<Asset> for AssetRecord {
    fn from(asset: Asset) -> Self {
        let status = asset.status();
        let published_url = match asset.publication {
            Publication::Published(url) => Some(url.into_inner()),
            _ => None,
        };
        Self {
            id: asset.id.0,
            filename: asset.filename.0,
            content_type: asset.content_type.0,
            file_size: asset.file_size.0,
            upload_date: asset.upload_date,
            status,
            published_url,
        }
    }
}

impl TryFrom<AssetRecord> for Asset {
    type Error = CoreError;

    fn try_from(record: AssetRecord) -> Result<Self, Self::Error> {
        Asset::restore(
            AssetId::new(record.id),
            Filename::new(record.filename),
            ContentType::new(record.content_type),
            FileSize::from(record.file_size),
            record.upload_date,
            record.status,
            record.published_url,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
