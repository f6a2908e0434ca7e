//! Repository for the `assets` table.
//!
//! Inserts pending records, replaces them with their terminal state, and
//! runs composed search queries.

use depot_core::asset::AssetStatus;
use depot_core::search::{AssetFilter, AssetQuery, SortDirection};
use sqlx::PgPool;

use crate::models::asset::{AssetRow, AssetValues};

/// Column list for `assets` queries.
const ASSET_COLUMNS: &str = "\
    external_id, filename, content_type, file_size, \
    upload_date, status_id, published_url";

/// Unique constraint guarding asset identity.
pub const UQ_EXTERNAL_ID: &str = "uq_assets_external_id";

/// Provides persistence operations for asset metadata.
pub struct AssetRepo;

impl AssetRepo {
    /// Insert a new asset row. A duplicate `external_id` violates
    /// [`UQ_EXTERNAL_ID`] and leaves the existing row untouched.
    pub async fn create(pool: &PgPool, values: &AssetValues<'_>) -> Result<AssetRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO assets (\
                external_id, filename, content_type, file_size, \
                upload_date, status_id, published_url\
             ) VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {ASSET_COLUMNS}"
        );
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(values.external_id)
            .bind(values.filename)
            .bind(values.content_type)
            .bind(values.file_size)
            .bind(values.upload_date)
            .bind(values.status_id)
            .bind(values.published_url)
            .fetch_one(pool)
            .await
    }

    /// Replace the mutable part of a still-pending row.
    ///
    /// Identity columns are never written. Returns `None` when no pending
    /// row has this `external_id`.
    pub async fn replace_pending(
        pool: &PgPool,
        values: &AssetValues<'_>,
    ) -> Result<Option<AssetRow>, sqlx::Error> {
        let query = format!(
            "UPDATE assets SET \
                status_id = $2, \
                published_url = $3, \
                updated_at = now() \
             WHERE external_id = $1 AND status_id = $4 \
             RETURNING {ASSET_COLUMNS}"
        );
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(values.external_id)
            .bind(values.status_id)
            .bind(values.published_url)
            .bind(AssetStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Run a composed search query.
    pub async fn find(pool: &PgPool, query: &AssetQuery) -> Result<Vec<AssetRow>, sqlx::Error> {
        let sql = format!(
            "SELECT {ASSET_COLUMNS} FROM assets {where_clause} {order_clause}",
            where_clause = where_clause(query),
            order_clause = order_clause(query.sort_direction()),
        );

        let mut q = sqlx::query_as::<_, AssetRow>(&sql);

        // Bind in the same order `where_clause` numbered them.
        for filter in query.filters() {
            match filter {
                AssetFilter::UploadDate(range) => {
                    if let Some(start) = range.start {
                        q = q.bind(start);
                    }
                    if let Some(end) = range.end {
                        q = q.bind(end);
                    }
                }
                AssetFilter::FilenameContains(pattern) => {
                    q = q.bind(pattern.clone());
                }
                AssetFilter::ContentTypeEquals(content_type) => {
                    q = q.bind(content_type.clone());
                }
            }
        }

        q.fetch_all(pool).await
    }
}

// ---------------------------------------------------------------------------
// SQL builders
// ---------------------------------------------------------------------------

/// Build the `WHERE` clause for a query, numbering placeholders from `$1`.
///
/// Filename matching uses `strpos` on the lowercased column so `%` and `_`
/// in the pattern are literal.
pub fn where_clause(query: &AssetQuery) -> String {
    let mut conditions = Vec::new();
    let mut bind_idx = 1u32;

    for filter in query.filters() {
        match filter {
            AssetFilter::UploadDate(range) => {
                if range.start.is_some() {
                    conditions.push(format!("upload_date >= ${bind_idx}"));
                    bind_idx += 1;
                }
                if range.end.is_some() {
                    conditions.push(format!("upload_date <= ${bind_idx}"));
                    bind_idx += 1;
                }
            }
            AssetFilter::FilenameContains(_) => {
                conditions.push(format!("strpos(lower(filename), ${bind_idx}) > 0"));
                bind_idx += 1;
            }
            AssetFilter::ContentTypeEquals(_) => {
                conditions.push(format!("content_type = ${bind_idx}"));
                bind_idx += 1;
            }
        }
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

/// Upload date is the only sort key; equal dates have no defined order.
pub fn order_clause(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "ORDER BY upload_date ASC",
        SortDirection::Desc => "ORDER BY upload_date DESC",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
