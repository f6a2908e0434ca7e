pub mod assets;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /assets                    search (GET)
/// /assets/actions/upload     upload (POST, multipart)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/assets", assets::router())
}
