//! Row model for the `assets` table.

use depot_core::asset::{Asset, AssetId, AssetStatus, ContentType, FileSize, Filename};
use depot_core::error::CoreError;
use depot_core::types::Timestamp;
use sqlx::FromRow;

/// A row from the `assets` table (surrogate key and audit columns omitted).
#[derive(Debug, Clone, FromRow)]
pub struct AssetRow {
    pub external_id: String,
    pub filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub upload_date: Timestamp,
    pub status_id: i16,
    pub published_url: Option<String>,
}

impl TryFrom<AssetRow> for Asset {
    type Error = CoreError;

    fn try_from(row: AssetRow) -> Result<Self, Self::Error> {
        Asset::restore(
            AssetId::new(row.external_id),
            Filename::new(row.filename),
            ContentType::new(row.content_type),
            FileSize::try_from(row.file_size)?,
            row.upload_date,
            AssetStatus::from_id(row.status_id)?,
            row.published_url,
        )
    }
}

/// Bindable column values for a domain asset.
#[derive(Debug, Clone)]
pub struct AssetValues<'a> {
    pub external_id: &'a str,
    pub filename: &'a str,
    pub content_type: &'a str,
    pub file_size: i64,
    pub upload_date: Timestamp,
    pub status_id: i16,
    pub published_url: Option<&'a str>,
}

impl<'a> AssetValues<'a> {
    pub fn from_asset(asset: &'a Asset) -> Result<Self, CoreError> {
        let file_size = i64::try_from(asset.file_size().bytes()).map_err(|_| {
            CoreError::Validation(format!(
                "File size {} exceeds the storable range",
                asset.file_size().bytes()
            ))
        })?;

        Ok(Self {
            external_id: asset.id().as_str(),
            filename: asset.filename().as_str(),
            content_type: asset.content_type().as_str(),
            file_size,
            upload_date: asset.upload_date(),
            status_id: asset.status().id(),
            published_url: asset.published_url().map(|url| url.as_str()),
        })
    }
}
