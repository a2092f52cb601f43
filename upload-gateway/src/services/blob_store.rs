use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::error::AppError;
use service_core::observability::TracedClientExt;
use std::path::PathBuf;
use tokio::fs;

/// Where a blob ended up.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub url: String,
    pub pathname: String,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fails when the backend cannot accept writes at all (e.g. missing
    /// credential). Called before the request body is read.
    fn ensure_writable(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn put(
        &self,
        pathname: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredBlob, AppError>;
}

/// Blob pathname for an uploaded file: `<uuid>/<file name>`.
///
/// Directory components of the client-supplied name are dropped.
pub fn blob_pathname(file_name: &str) -> String {
    let base = std::path::Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("unnamed");
    format!("{}/{}", uuid::Uuid::new_v4(), base)
}

fn join_url(base: &str, pathname: &str) -> Result<Url, AppError> {
    let mut url = Url::parse(base).map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("Invalid blob base URL '{}': {}", base, e))
    })?;
    url.path_segments_mut()
        .map_err(|_| {
            AppError::ConfigError(anyhow::anyhow!("Blob base URL '{}' cannot be a base", base))
        })?
        .pop_if_empty()
        .extend(pathname.split('/'));
    Ok(url)
}

pub struct LocalBlobStore {
    base_path: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub async fn new(
        base_path: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> Result<Self, AppError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self {
            base_path,
            public_base_url: public_base_url.into(),
        })
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(
        &self,
        pathname: &str,
        _content_type: &str,
        data: Bytes,
    ) -> Result<StoredBlob, AppError> {
        let path = self.base_path.join(pathname);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &data).await.map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Failed to write blob");
            AppError::StorageError(format!("Failed to write blob: {}", e))
        })?;

        Ok(StoredBlob {
            url: join_url(&self.public_base_url, pathname)?.to_string(),
            pathname: pathname.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct BlobApiResponse {
    url: String,
}

#[derive(Debug, Deserialize)]
struct BlobApiError {
    error: Option<String>,
    message: Option<String>,
}

/// Remote blob API: `PUT <api_url>/<pathname>` with a bearer token,
/// answering `{"url": ...}`.
pub struct HttpBlobStore {
    client: Client,
    api_url: String,
    token: Option<Secret<String>>,
}

impl HttpBlobStore {
    pub fn new(api_url: impl Into<String>, token: Option<Secret<String>>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into(),
            token,
        }
    }

    fn token(&self) -> Result<&Secret<String>, AppError> {
        self.token.as_ref().ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!("BLOB_READ_WRITE_TOKEN is not configured"))
        })
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    fn ensure_writable(&self) -> Result<(), AppError> {
        self.token().map(|_| ())
    }

    async fn put(
        &self,
        pathname: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredBlob, AppError> {
        let token = self.token()?;
        let url = join_url(&self.api_url, pathname)?;

        let response = self
            .client
            .traced_put(url.as_str())
            .bearer_auth(token.expose_secret())
            .header("content-type", content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %url, error = %e, "Blob API request failed");
                AppError::StorageError(format!("Blob storage request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<BlobApiError>()
                .await
                .ok()
                .and_then(|body| body.error.or(body.message))
                .unwrap_or_else(|| format!("Blob storage returned HTTP {}", status.as_u16()));
            tracing::error!(url = %url, status = %status, message = %message, "Blob API rejected upload");
            return Err(AppError::StorageError(message));
        }

        let body: BlobApiResponse = response.json().await.map_err(|e| {
            AppError::StorageError(format!("Invalid response from blob storage: {}", e))
        })?;

        Ok(StoredBlob {
            url: body.url,
            pathname: pathname.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pathname_strips_directories() {
        let pathname = blob_pathname("../../etc/passwd");
        let (prefix, name) = pathname.split_once('/').unwrap();
        assert!(uuid::Uuid::parse_str(prefix).is_ok());
        assert_eq!(name, "passwd");
    }

    #[test]
    fn pathname_of_empty_name_is_unnamed() {
        assert!(blob_pathname("").ends_with("/unnamed"));
    }

    #[test]
    fn join_url_encodes_segments() {
        let url = join_url("http://localhost:9000/blobs/", "abc/q3 report.pdf").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/blobs/abc/q3%20report.pdf");
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let store = HttpBlobStore::new("http://localhost:9100", None);
        assert!(matches!(
            store.ensure_writable(),
            Err(AppError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn local_store_writes_bytes_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://localhost:8080/blobs")
            .await
            .unwrap();

        let data = Bytes::from_static(&[0x25, 0x50, 0x44, 0x46, 0x00, 0xff]);
        let stored = store
            .put("k1/a.pdf", "application/pdf", data.clone())
            .await
            .unwrap();

        assert_eq!(stored.url, "http://localhost:8080/blobs/k1/a.pdf");
        let on_disk = std::fs::read(dir.path().join("k1/a.pdf")).unwrap();
        assert_eq!(on_disk, data.to_vec());
    }
}
