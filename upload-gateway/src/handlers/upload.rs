use crate::dtos::{UploadParams, UploadResponse};
use crate::services::blob_store::blob_pathname;
use crate::services::record_upload;
use crate::startup::AppState;
use axum::{
    body::to_bytes,
    extract::{FromRequest, Multipart, Query, Request, State},
    http::{header, Method},
    Json,
};
use bytes::Bytes;
use service_core::error::AppError;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// File pulled out of an upload request, before it is handed to storage.
struct IncomingFile {
    file_name: String,
    content_type: String,
    data: Bytes,
}

/// `POST /api/upload`
///
/// Accepts either `?filename=<name>` with the raw file as body, or a
/// `multipart/form-data` body with a `file` field. The bytes are forwarded
/// to the blob store unmodified.
pub async fn upload_blob(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    request: Request,
) -> Result<Json<UploadResponse>, AppError> {
    if let Err(e) = state.storage.ensure_writable() {
        tracing::error!(error = %e, "Blob store is not writable");
        record_upload("config_error", None);
        return Err(e);
    }

    let filename = params.filename.filter(|f| !f.trim().is_empty());

    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    let incoming = if is_multipart {
        read_multipart(request, filename).await
    } else {
        read_raw(request, filename).await
    }
    .inspect_err(|_| record_upload("rejected", None))?;

    let pathname = blob_pathname(&incoming.file_name);
    let size = incoming.data.len();

    tracing::info!(
        file_name = %incoming.file_name,
        pathname = %pathname,
        size = size,
        "Blob upload started"
    );

    let stored = state
        .storage
        .put(&pathname, &incoming.content_type, incoming.data)
        .await
        .map_err(|e| {
            tracing::error!(pathname = %pathname, error = %e, "Blob upload failed");
            record_upload("failed", None);
            e
        })?;

    record_upload("success", Some(size));
    tracing::info!(pathname = %stored.pathname, url = %stored.url, "Blob upload completed");

    Ok(Json(UploadResponse {
        url: stored.url,
        pathname: stored.pathname,
        size: size as u64,
        content_type: incoming.content_type,
    }))
}

async fn read_raw(request: Request, filename: Option<String>) -> Result<IncomingFile, AppError> {
    let file_name =
        filename.ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Missing filename")))?;

    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();

    let data = to_bytes(request.into_body(), usize::MAX)
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Failed to read request body: {}", e)))?;

    Ok(IncomingFile {
        file_name,
        content_type,
        data,
    })
}

async fn read_multipart(
    request: Request,
    filename: Option<String>,
) -> Result<IncomingFile, AppError> {
    let mut multipart = Multipart::from_request(request, &()).await.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Failed to parse multipart body: {}", e))
    })?;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = filename
            .or_else(|| field.file_name().map(str::to_string))
            .filter(|f| !f.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Missing filename")))?;
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let data = field.bytes().await.map_err(|e| {
            AppError::BadRequest(anyhow::anyhow!("Failed to read file bytes: {}", e))
        })?;

        return Ok(IncomingFile {
            file_name,
            content_type,
            data,
        });
    }

    Err(AppError::BadRequest(anyhow::anyhow!(
        "No file uploaded (expected a 'file' field)"
    )))
}

/// Fallback for every non-POST method on the upload route.
pub async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(method.to_string())
}
