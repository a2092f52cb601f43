//! Pure UI-state mutations: filters, view mode, modals, notification.

use crate::error::TrackerError;
use crate::models::{Filters, ViewMode};
use crate::views::DocumentsFragment;
use crate::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct FilterForm {
    #[serde(default)]
    pub division: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Deserialize)]
pub struct ViewForm {
    pub mode: String,
}

async fn render_list(state: &AppState) -> Response {
    DocumentsFragment::from_state(&state.controller.snapshot().await).into_response()
}

/// `POST /filters`
pub async fn set_filters(
    State(state): State<AppState>,
    Form(form): Form<FilterForm>,
) -> Result<Response, TrackerError> {
    let filters = Filters::parse(&form.division, &form.status, &form.search)?;
    state.controller.set_filters(filters).await;
    Ok(render_list(&state).await)
}

/// `POST /view`
pub async fn set_view(
    State(state): State<AppState>,
    Form(form): Form<ViewForm>,
) -> Result<Response, TrackerError> {
    let mode: ViewMode = form.mode.parse()?;
    state.controller.set_view(mode).await;
    Ok(render_list(&state).await)
}

pub async fn open_upload_modal(State(state): State<AppState>) -> Redirect {
    state.controller.open_upload_modal().await;
    Redirect::to("/")
}

pub async fn close_upload_modal(State(state): State<AppState>) -> Redirect {
    state.controller.close_upload_modal().await;
    Redirect::to("/")
}

pub async fn close_delete_modal(State(state): State<AppState>) -> Redirect {
    state.controller.close_delete_modal().await;
    Redirect::to("/")
}

pub async fn dismiss_notification(State(state): State<AppState>) -> Redirect {
    state.controller.dismiss_notification().await;
    Redirect::to("/")
}

/// `POST /reload` re-fetches the collection. A failed load is shown on the
/// page itself, so this always redirects.
pub async fn reload(State(state): State<AppState>) -> Redirect {
    let _ = state.controller.load().await;
    Redirect::to("/")
}
