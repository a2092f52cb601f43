use crate::config::{BlobBackend, GatewayConfig};
use crate::handlers;
use crate::services::{BlobStore, HttpBlobStore, LocalBlobStore};
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use service_core::observability::extract_request_id;
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: GatewayConfig,
    pub storage: Arc<dyn BlobStore>,
}

pub fn build_router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/api/upload",
            post(handlers::upload_blob)
                .fallback(handlers::method_not_allowed)
                .layer(DefaultBodyLimit::disable()),
        );

    if state.config.blob.backend == BlobBackend::Local {
        app = app.nest_service("/blobs", ServeDir::new(&state.config.blob.local_path));
    }

    app.layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id =
                    extract_request_id(request.headers()).unwrap_or_else(|| "-".to_string());

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

async fn build_blob_store(
    config: &GatewayConfig,
    port: u16,
) -> Result<Arc<dyn BlobStore>, AppError> {
    match config.blob.backend {
        BlobBackend::Http => {
            if config.blob.read_write_token.is_none() {
                tracing::warn!("BLOB_READ_WRITE_TOKEN is not set; uploads will be rejected");
            }
            Ok(Arc::new(HttpBlobStore::new(
                config.blob.api_url.clone(),
                config.blob.read_write_token.clone(),
            )))
        }
        BlobBackend::Local => {
            let public_base_url = config
                .blob
                .public_base_url
                .clone()
                .unwrap_or_else(|| format!("http://127.0.0.1:{}/blobs", port));
            let store = LocalBlobStore::new(&config.blob.local_path, public_base_url)
                .await
                .map_err(|e| {
                    tracing::error!(
                        "Failed to initialize local blob storage at {}: {}",
                        config.blob.local_path,
                        e
                    );
                    e
                })?;
            Ok(Arc::new(store))
        }
    }
}

type ServerFuture = Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>;

pub struct Application {
    port: u16,
    server: ServerFuture,
}

impl Application {
    pub async fn build(config: GatewayConfig) -> Result<Self, AppError> {
        Self::build_with_shutdown(config, std::future::pending()).await
    }

    pub async fn build_with_shutdown(
        config: GatewayConfig,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        let storage = build_blob_store(&config, port).await?;
        let state = AppState { config, storage };
        let app = build_router(state);

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown);

        Ok(Self {
            port,
            server: Box::pin(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
