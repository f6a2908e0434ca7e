#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use depot_api::config::{ServerConfig, StoreBackend};
use depot_api::router::build_app_router;
use depot_api::state::AppState;
use depot_core::asset::{Asset, PublishedUrl};
use depot_core::error::PublishError;
use depot_core::lifecycle::AssetService;
use depot_core::memory::InMemoryAssetStore;
use depot_core::ports::AssetPublisher;

pub const BOUNDARY: &str = "depot-test-boundary";

/// Build a test `ServerConfig` with safe defaults and the in-memory store.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        max_upload_bytes: 1024,
        store: StoreBackend::Memory,
    }
}

/// Publisher that answers immediately, succeeding unless told to fail.
pub struct StubPublisher {
    pub fail: bool,
}

#[async_trait]
impl AssetPublisher for StubPublisher {
    async fn publish(&self, asset: &Asset, _content: &[u8]) -> Result<PublishedUrl, PublishError> {
        if self.fail {
            return Err(PublishError::Rejected("stub failure".to_string()));
        }
        PublishedUrl::new(format!("https://cdn.test/{}", asset.id()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryAssetStore>,
    pub assets: AssetService,
}

/// Build the full application router (same middleware as production) over
/// an in-memory store and a stub publisher.
pub fn build_test_app() -> TestApp {
    build_test_app_with(StubPublisher { fail: false })
}

pub fn build_test_app_with(publisher: StubPublisher) -> TestApp {
    let config = test_config();
    let store = Arc::new(InMemoryAssetStore::new());
    let assets = AssetService::new(store.clone(), Arc::new(publisher));

    let state = AppState {
        assets: assets.clone(),
    };

    TestApp {
        router: build_app_router(state, &config, None),
        store,
        assets,
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Build a `multipart/form-data` body with a single file part.
pub fn multipart_body(field: &str, filename: &str, content_type: &str, content: &[u8]) -> Vec<u8> {
    multipart_parts(&[(field, filename, content_type, content)])
}

/// Build a `multipart/form-data` body from `(field, filename, content type, bytes)` parts.
pub fn multipart_parts(parts: &[(&str, &str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, filename, content_type, content) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(app: Router, uri: &str, body: Vec<u8>) -> Response<Body> {
    let request = Request::post(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn upload(app: Router, filename: &str, content_type: &str, content: &[u8]) -> Response<Body> {
    post_multipart(
        app,
        "/api/v1/assets/actions/upload",
        multipart_body("file", filename, content_type, content),
    )
    .await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
