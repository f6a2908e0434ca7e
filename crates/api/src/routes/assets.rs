//! Route definitions for assets, mounted under `/assets`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::assets;
use crate::state::AppState;

/// ```text
/// GET    /                 -> search_assets
/// POST   /actions/upload   -> upload_asset
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(assets::search_assets))
        .route("/actions/upload", post(assets::upload_asset))
}
