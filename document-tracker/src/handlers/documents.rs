use crate::controller::{Notification, Preview, SubmitOutcome};
use crate::error::TrackerError;
use crate::models::{Division, DocumentStatus, NewDocument, UploadFile};
use crate::views::IndexTemplate;
use crate::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

const SUBMISSION_IN_FLIGHT: &str = "Another submission is still in progress";

/// Full page with the status of the failure. The controller has already put
/// the error into the notification banner.
async fn render_failure(state: &AppState, error: &TrackerError) -> Response {
    let snapshot = state.controller.snapshot().await;
    (error.status_code(), IndexTemplate::from_state(&snapshot)).into_response()
}

fn submitted(outcome: SubmitOutcome) -> Response {
    match outcome {
        SubmitOutcome::Completed => Redirect::to("/").into_response(),
        SubmitOutcome::Ignored => (StatusCode::CONFLICT, SUBMISSION_IN_FLIGHT).into_response(),
    }
}

/// Reads the upload form: `name`, `division`, `status` and `file`.
async fn read_upload_form(mut multipart: Multipart) -> Result<NewDocument, TrackerError> {
    let mut name = String::new();
    let mut division = None;
    let mut status = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| TrackerError::Validation(format!("Invalid upload form: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| TrackerError::Validation(format!("Failed to read file: {}", e)))?;
                // Browsers send an empty, unnamed part when no file was chosen.
                if !file_name.is_empty() || !bytes.is_empty() {
                    file = Some(UploadFile::new(file_name, content_type, bytes));
                }
            }
            "name" | "division" | "status" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| TrackerError::Validation(format!("Invalid upload form: {}", e)))?;
                match field_name.as_str() {
                    "name" => name = value,
                    "division" => division = Some(value.parse::<Division>()?),
                    _ => status = Some(value.parse::<DocumentStatus>()?),
                }
            }
            other => tracing::debug!(field = %other, "Ignoring unknown upload form field"),
        }
    }

    let division =
        division.ok_or_else(|| TrackerError::Validation("Division is required".to_string()))?;
    let status = status.ok_or_else(|| TrackerError::Validation("Status is required".to_string()))?;

    Ok(NewDocument::new(name, division, status, file))
}

/// `POST /documents`
pub async fn create_document(State(state): State<AppState>, multipart: Multipart) -> Response {
    let input = match read_upload_form(multipart).await {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected upload form");
            state
                .controller
                .notify(Notification::error(e.to_string()))
                .await;
            return render_failure(&state, &e).await;
        }
    };

    match state.controller.submit_create(input).await {
        Ok(outcome) => submitted(outcome),
        Err(e) => render_failure(&state, &e).await,
    }
}

/// `POST /documents/{id}/delete` opens the confirmation dialog.
pub async fn request_delete(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Redirect, TrackerError> {
    state.controller.request_delete(id).await?;
    Ok(Redirect::to("/"))
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmDeleteForm {
    #[serde(default)]
    pub acknowledged: Option<String>,
}

impl ConfirmDeleteForm {
    fn is_acknowledged(&self) -> bool {
        matches!(self.acknowledged.as_deref(), Some("true" | "on" | "1"))
    }
}

/// `POST /delete-modal/confirm`
pub async fn confirm_delete(
    State(state): State<AppState>,
    Form(form): Form<ConfirmDeleteForm>,
) -> Response {
    match state.controller.confirm_delete(form.is_acknowledged()).await {
        Ok(outcome) => submitted(outcome),
        Err(e) => render_failure(&state, &e).await,
    }
}

/// Sent with every cached file: no script, no subresources, own origin.
const PREVIEW_CSP: &str = "sandbox; default-src 'none'";

/// Whether a cached file may be rendered by the browser. Markup that can
/// carry script (HTML, SVG, XHTML, XML) is always downloaded instead.
fn renders_inline(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.split_once('/') {
        Some(("image", subtype)) => !subtype.starts_with("svg"),
        Some(("audio" | "video", _)) => true,
        _ => matches!(essence.as_str(), "application/pdf" | "text/plain"),
    }
}

/// `GET /documents/{id}/open`
///
/// Files uploaded by this process are served from memory; anything else
/// redirects to its stored URL.
pub async fn open_document(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Response, TrackerError> {
    match state.controller.open_document(id).await? {
        Preview::Cached(file) => {
            let content_type = file.content_type_or_default().to_string();
            let disposition_type = if renders_inline(&content_type) {
                "inline"
            } else {
                "attachment"
            };
            let disposition = format!(
                "{}; filename=\"{}\"",
                disposition_type,
                file.name.replace(['"', '\\', '\r', '\n'], "_")
            );
            Ok((
                [
                    (header::CONTENT_TYPE, content_type),
                    (header::CONTENT_DISPOSITION, disposition),
                    (header::CONTENT_SECURITY_POLICY, PREVIEW_CSP.to_string()),
                    (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
                ],
                file.bytes,
            )
                .into_response())
        }
        Preview::Remote(url) => Ok(Redirect::to(&url).into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_passive_types_render_inline() {
        for inline in [
            "application/pdf",
            "text/plain; charset=utf-8",
            "image/png",
            "VIDEO/mp4",
        ] {
            assert!(renders_inline(inline), "{}", inline);
        }
        for download in [
            "text/html",
            "Text/HTML; charset=utf-8",
            "image/svg+xml",
            "application/xhtml+xml",
            "text/xml",
            "application/octet-stream",
            "",
        ] {
            assert!(!renders_inline(download), "{}", download);
        }
    }
}
