use crate::error::TrackerError;
use crate::models::UploadFile;
use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::Deserialize;
use service_core::observability::TracedClientExt;

/// How the file is sent to the upload gateway.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// `?filename=<name>` with the raw bytes as body.
    #[default]
    Raw,
    /// `multipart/form-data` with a `file` field.
    Multipart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedBlob {
    pub url: String,
}

#[async_trait]
pub trait BlobUploader: Send + Sync {
    async fn upload(&self, file: &UploadFile) -> Result<UploadedBlob, TrackerError>;
}

#[derive(Debug, Deserialize)]
struct GatewayResponse {
    url: String,
}

#[derive(Debug, Deserialize)]
struct GatewayError {
    error: Option<String>,
}

/// HTTP client of the upload gateway's `POST /api/upload`.
pub struct GatewayUploadClient {
    client: Client,
    base_url: String,
    mode: UploadMode,
}

impl GatewayUploadClient {
    pub fn new(base_url: impl Into<String>, mode: UploadMode) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            mode,
        }
    }

    fn upload_url(&self) -> String {
        format!("{}/api/upload", self.base_url)
    }
}

#[async_trait]
impl BlobUploader for GatewayUploadClient {
    async fn upload(&self, file: &UploadFile) -> Result<UploadedBlob, TrackerError> {
        let url = self.upload_url();
        let request = self.client.traced_post(&url);

        let request = match self.mode {
            UploadMode::Raw => request
                .query(&[("filename", file.name.as_str())])
                .header("content-type", file.content_type_or_default())
                .body(file.bytes.clone()),
            UploadMode::Multipart => {
                let part = multipart::Part::bytes(file.bytes.to_vec())
                    .file_name(file.name.clone())
                    .mime_str(file.content_type_or_default())
                    .map_err(|e| {
                        TrackerError::Validation(format!("Invalid file content type: {}", e))
                    })?;
                request.multipart(multipart::Form::new().part("file", part))
            }
        };

        let response = request.send().await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "Failed to reach upload gateway");
            TrackerError::Upload(format!("Could not reach upload gateway: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<GatewayError>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| format!("Upload gateway returned HTTP {}", status.as_u16()));
            tracing::error!(
                file_name = %file.name,
                status = %status,
                message = %message,
                "Upload gateway rejected file"
            );
            return Err(TrackerError::Upload(message));
        }

        let body: GatewayResponse = response.json().await.map_err(|e| {
            TrackerError::Upload(format!("Invalid response from upload gateway: {}", e))
        })?;

        Ok(UploadedBlob { url: body.url })
    }
}
