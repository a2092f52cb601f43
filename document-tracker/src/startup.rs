use crate::config::{MetadataBackend, Settings};
use crate::controller::AppController;
use crate::error::TrackerError;
use crate::handlers::{app, documents, ui};
use crate::services::{
    DocumentRepository, GatewayUploadClient, JsonBinStore, LocalFileStore, MetadataStore,
};
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use service_core::observability::extract_request_id;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(app::index))
        .route("/health", get(app::health_check))
        .route("/metrics", get(app::metrics))
        .route(
            "/documents",
            get(app::documents_fragment)
                .post(documents::create_document)
                .layer(DefaultBodyLimit::disable()),
        )
        .route("/documents/:id/open", get(documents::open_document))
        .route("/documents/:id/delete", post(documents::request_delete))
        .route("/delete-modal/confirm", post(documents::confirm_delete))
        .route("/delete-modal/close", post(ui::close_delete_modal))
        .route("/upload-modal", post(ui::open_upload_modal))
        .route("/upload-modal/close", post(ui::close_upload_modal))
        .route("/filters", post(ui::set_filters))
        .route("/view", post(ui::set_view))
        .route("/notification/dismiss", post(ui::dismiss_notification))
        .route("/reload", post(ui::reload))
        .layer(from_fn(security_headers_middleware))
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

fn build_metadata_store(settings: &Settings) -> Result<Arc<dyn MetadataStore>, TrackerError> {
    match settings.metadata.backend {
        MetadataBackend::Local => {
            tracing::info!(path = %settings.metadata.local_path, "Using local metadata file");
            Ok(Arc::new(LocalFileStore::new(&settings.metadata.local_path)))
        }
        MetadataBackend::Remote => {
            let jsonbin = settings.metadata.jsonbin.as_ref().ok_or_else(|| {
                TrackerError::Config("metadata.jsonbin must be set for the remote backend".into())
            })?;
            let master_key = jsonbin.master_key.clone().ok_or_else(|| {
                TrackerError::Config("APP_METADATA__JSONBIN__MASTER_KEY is not configured".into())
            })?;
            tracing::info!(
                base_url = %jsonbin.base_url,
                collection = %jsonbin.collection,
                "Using remote metadata store"
            );
            Ok(Arc::new(JsonBinStore::new(
                jsonbin.base_url.clone(),
                jsonbin.collection.clone(),
                master_key,
            )))
        }
    }
}

/// Wire store, uploader and controller together and run the initial load.
/// A failed initial load is not fatal; the page shows the error instead.
pub async fn build_state(settings: &Settings) -> Result<AppState, TrackerError> {
    let store = build_metadata_store(settings)?;
    let uploader = Arc::new(GatewayUploadClient::new(
        settings.gateway.url.clone(),
        settings.gateway.upload_mode,
    ));

    let controller = Arc::new(AppController::new(DocumentRepository::new(store, uploader)));
    if let Err(e) = controller.load().await {
        tracing::warn!(error = %e, "Initial document load failed");
    }

    Ok(AppState::new(controller))
}

type ServerFuture = Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>;

pub struct Application {
    port: u16,
    server: ServerFuture,
}

impl Application {
    pub async fn build(settings: Settings) -> Result<Self, anyhow::Error> {
        Self::build_with_shutdown(settings, std::future::pending()).await
    }

    pub async fn build_with_shutdown(
        settings: Settings,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<Self, anyhow::Error> {
        let state = build_state(&settings).await?;

        let address = format!("{}:{}", settings.server.host, settings.server.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Starting document-tracker on {}:{}", settings.server.host, port);

        let server = axum::serve(listener, build_router(state)).with_graceful_shutdown(shutdown);

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
