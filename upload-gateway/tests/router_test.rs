use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
};
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;
use upload_gateway::config::{BlobBackend, BlobConfig, GatewayConfig};
use upload_gateway::services::{HttpBlobStore, LocalBlobStore};
use upload_gateway::startup::{build_router, AppState};

async fn local_state(dir: &TempDir) -> AppState {
    let local_path = dir.path().to_string_lossy().to_string();
    let storage = LocalBlobStore::new(&local_path, "http://blobs.test/blobs")
        .await
        .expect("Failed to create local store");
    AppState {
        config: GatewayConfig {
            common: CoreConfig::default(),
            blob: BlobConfig {
                backend: BlobBackend::Local,
                api_url: "http://unused.invalid".to_string(),
                read_write_token: None,
                local_path,
                public_base_url: None,
            },
        },
        storage: Arc::new(storage),
    }
}

async fn send(state: AppState, request: Request<Body>) -> Response {
    build_router(state)
        .oneshot(request)
        .await
        .expect("Failed to execute request")
}

async fn json_body(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn upload_route_rejects_other_methods() {
    let dir = tempfile::tempdir().unwrap();

    for verb in ["GET", "PUT", "DELETE"] {
        let request = Request::builder()
            .method(verb)
            .uri("/api/upload")
            .body(Body::empty())
            .unwrap();
        let response = send(local_state(&dir).await, request).await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers().get(header::CONTENT_SECURITY_POLICY).unwrap(),
            "default-src 'none'; frame-ancestors 'none'"
        );
        let body = json_body(response).await;
        assert_eq!(body["error"], format!("Method {} not allowed", verb));
    }
}

#[tokio::test]
async fn stored_blobs_are_served_only_by_local_backend() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("hello.txt"), b"hi").unwrap();
    let get = |uri: &str| Request::builder().uri(uri).body(Body::empty()).unwrap();

    let response = send(local_state(&dir).await, get("/blobs/hello.txt")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"hi");

    let mut state = local_state(&dir).await;
    state.config.blob.backend = BlobBackend::Http;
    state.storage = Arc::new(HttpBlobStore::new("http://unused.invalid", None));
    let response = send(state, get("/blobs/hello.txt")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
