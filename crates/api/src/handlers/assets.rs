//! Handlers for uploading and searching assets.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::Json;
use depot_core::asset::{Asset, AssetId};
use depot_core::lifecycle::AssetUploadCommand;
use depot_core::search::{SearchCriteria, SortDirection};
use depot_core::types::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /assets`.
#[derive(Debug, Default, Deserialize)]
pub struct AssetSearchParams {
    pub upload_date_start: Option<Timestamp>,
    pub upload_date_end: Option<Timestamp>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub sort_direction: Option<SortDirection>,
}

impl From<AssetSearchParams> for SearchCriteria {
    fn from(params: AssetSearchParams) -> Self {
        Self {
            upload_date_start: params.upload_date_start,
            upload_date_end: params.upload_date_end,
            filename: params.filename,
            content_type: params.content_type,
            sort_direction: params.sort_direction,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadAccepted {
    pub id: AssetId,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/assets/actions/upload
///
/// Accepts a multipart form with a required `file` field. Filename and
/// content type come from the part headers; the size is the number of bytes
/// received. Responds `202 Accepted` once the pending record is stored;
/// publishing continues in the background.
pub async fn upload_asset(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<UploadAccepted>>)> {
    let mut upload: Option<AssetUploadCommand> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        if upload.is_some() {
            return Err(AppError::BadRequest(format!(
                "Only one '{UPLOAD_FIELD}' field is allowed"
            )));
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let content = field.bytes().await.map_err(multipart_error)?.to_vec();
        let size = i64::try_from(content.len())
            .map_err(|_| AppError::PayloadTooLarge("Upload exceeds the supported size".into()))?;

        upload = Some(AssetUploadCommand {
            filename,
            content_type,
            size,
            content,
        });
    }

    let command =
        upload.ok_or_else(|| AppError::BadRequest(format!("Missing required '{UPLOAD_FIELD}' field")))?;

    let result = state.assets.upload(command).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: UploadAccepted {
                id: result.asset_id,
            },
        }),
    ))
}

/// GET /api/v1/assets
///
/// Every parameter is optional. Dates are RFC 3339; `sort_direction` is
/// `asc` (default) or `desc`.
pub async fn search_assets(
    State(state): State<AppState>,
    params: Result<Query<AssetSearchParams>, QueryRejection>,
) -> AppResult<Json<DataResponse<Vec<Asset>>>> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let assets = state.assets.search(&params.into()).await?;
    Ok(Json(DataResponse { data: assets }))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}
