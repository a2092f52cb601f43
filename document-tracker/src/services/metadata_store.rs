//! Whole-collection persistence of document records.
//!
//! Both stores read and write the entire list at once. There is no version
//! token: two clients doing read-modify-write at the same time race, and the
//! last `replace_all` wins.

use crate::error::TrackerError;
use crate::models::Document;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::observability::TracedClientExt;
use std::path::PathBuf;
use tokio::fs;

#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// The full collection. A collection that was never written is empty.
    async fn list_all(&self) -> Result<Vec<Document>, TrackerError>;

    /// Overwrite the full collection.
    async fn replace_all(&self, documents: &[Document]) -> Result<(), TrackerError>;
}

/// Header carrying the JSON store credential.
pub const MASTER_KEY_HEADER: &str = "X-Master-Key";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

async fn error_message(response: reqwest::Response, fallback: String) -> String {
    response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message.or(body.error))
        .filter(|m| !m.is_empty())
        .unwrap_or(fallback)
}

/// Remote JSON document store holding the collection as a single record.
///
/// `GET <base_url>/<collection>/latest` answers `{"record": [...]}`,
/// `PUT <base_url>/<collection>` replaces it.
pub struct JsonBinStore {
    client: Client,
    base_url: String,
    collection: String,
    master_key: Secret<String>,
}

impl JsonBinStore {
    pub fn new(
        base_url: impl Into<String>,
        collection: impl Into<String>,
        master_key: Secret<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            collection: collection.into(),
            master_key,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, self.collection)
    }
}

#[async_trait]
impl MetadataStore for JsonBinStore {
    async fn list_all(&self) -> Result<Vec<Document>, TrackerError> {
        let url = format!("{}/latest", self.collection_url());

        let response = self
            .client
            .traced_get(&url)
            .header(MASTER_KEY_HEADER, self.master_key.expose_secret())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %url, error = %e, "Failed to reach metadata store");
                TrackerError::Fetch(format!("Failed to reach metadata store: {}", e))
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::info!(url = %url, "Metadata collection not initialized yet");
            return Ok(Vec::new());
        }
        if !status.is_success() {
            let message = error_message(
                response,
                format!("Failed to fetch documents (HTTP {})", status.as_u16()),
            )
            .await;
            tracing::error!(url = %url, status = %status, message = %message, "Metadata fetch failed");
            return Err(TrackerError::Fetch(message));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            TrackerError::Fetch(format!("Invalid response from metadata store: {}", e))
        })?;

        match body.get("record") {
            Some(record) if record.is_array() => serde_json::from_value(record.clone())
                .map_err(|e| TrackerError::Fetch(format!("Invalid document data: {}", e))),
            _ => Ok(Vec::new()),
        }
    }

    async fn replace_all(&self, documents: &[Document]) -> Result<(), TrackerError> {
        let url = self.collection_url();

        let response = self
            .client
            .traced_put(&url)
            .header(MASTER_KEY_HEADER, self.master_key.expose_secret())
            .json(documents)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %url, error = %e, "Failed to reach metadata store");
                TrackerError::Fetch(format!("Failed to reach metadata store: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(
                response,
                format!("Failed to save documents (HTTP {})", status.as_u16()),
            )
            .await;
            tracing::error!(url = %url, status = %status, message = %message, "Metadata write failed");
            return Err(TrackerError::Fetch(message));
        }

        tracing::debug!(count = documents.len(), "Metadata collection replaced");
        Ok(())
    }
}

/// The collection as one JSON file on local disk.
pub struct LocalFileStore {
    path: PathBuf,
}

impl LocalFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MetadataStore for LocalFileStore {
    async fn list_all(&self) -> Result<Vec<Document>, TrackerError> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to read document file");
                return Err(TrackerError::Fetch(format!(
                    "Failed to read stored documents: {}",
                    e
                )));
            }
        };

        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&raw)
            .map_err(|e| TrackerError::Fetch(format!("Stored document list is corrupt: {}", e)))
    }

    async fn replace_all(&self, documents: &[Document]) -> Result<(), TrackerError> {
        let write_error =
            |e: std::io::Error| TrackerError::Fetch(format!("Failed to save documents: {}", e));

        let json = serde_json::to_vec_pretty(documents)
            .map_err(|e| TrackerError::Fetch(format!("Failed to encode documents: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(write_error)?;
        }

        // Readers never see a half-written list.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await.map_err(write_error)?;
        fs::rename(&tmp, &self.path).await.map_err(write_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Division, DocumentStatus};

    fn doc(id: u64) -> Document {
        Document {
            id,
            name: format!("Doc {}", id),
            division: Division::HR,
            status: DocumentStatus::Pending,
            file_name: format!("doc{}.pdf", id),
            file_url: format!("https://blob.test/doc{}.pdf", id),
        }
    }

    #[tokio::test]
    async fn local_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path().join("documents.json"));
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn local_store_replaces_whole_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path().join("nested/documents.json"));

        store.replace_all(&[doc(1), doc(2)]).await.unwrap();
        store.replace_all(&[doc(2)]).await.unwrap();

        assert_eq!(store.list_all().await.unwrap(), vec![doc(2)]);
        assert!(!dir.path().join("nested/documents.json.tmp").exists());
    }

    #[tokio::test]
    async fn local_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("documents.json");
        std::fs::write(&path, b"{not json").unwrap();

        let err = LocalFileStore::new(path).list_all().await.unwrap_err();
        assert!(matches!(err, TrackerError::Fetch(msg) if msg.contains("corrupt")));
    }
}
