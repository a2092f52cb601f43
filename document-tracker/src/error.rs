use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failures of the document repository and the UI controller.
///
/// `Upload` and `Metadata` are kept apart so the UI can tell "nothing
/// happened" from "the file is stored but no record points at it".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("{0}")]
    Validation(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("File was uploaded but saving the document failed: {0}")]
    Metadata(String),

    #[error("Document {0} not found")]
    NotFound(u64),

    #[error("{0}")]
    Fetch(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TrackerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TrackerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TrackerError::NotFound(_) => StatusCode::NOT_FOUND,
            TrackerError::Upload(_) | TrackerError::Metadata(_) | TrackerError::Fetch(_) => {
                StatusCode::BAD_GATEWAY
            }
            TrackerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TrackerError::Validation(_) => "validation",
            TrackerError::Upload(_) => "upload",
            TrackerError::Metadata(_) => "metadata",
            TrackerError::NotFound(_) => "not_found",
            TrackerError::Fetch(_) => "fetch",
            TrackerError::Config(_) => "config",
        }
    }
}

impl From<validator::ValidationErrors> for TrackerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| errors.to_string());
        TrackerError::Validation(message)
    }
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_and_metadata_errors_read_differently() {
        let upload = TrackerError::Upload("gateway down".into());
        let metadata = TrackerError::Metadata("store down".into());
        assert_eq!(upload.to_string(), "Upload failed: gateway down");
        assert!(metadata.to_string().starts_with("File was uploaded"));
        assert_ne!(upload.kind(), metadata.kind());
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(TrackerError::NotFound(7).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(TrackerError::NotFound(7).to_string(), "Document 7 not found");
    }
}
