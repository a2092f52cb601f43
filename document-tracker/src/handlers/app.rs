use crate::views::{DocumentsFragment, IndexTemplate};
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};

/// `GET /` renders the whole page from the current state.
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    IndexTemplate::from_state(&state.controller.snapshot().await)
}

/// `GET /documents` renders only the document list.
pub async fn documents_fragment(State(state): State<AppState>) -> impl IntoResponse {
    DocumentsFragment::from_state(&state.controller.snapshot().await)
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        crate::services::metrics::get_metrics(),
    )
}
