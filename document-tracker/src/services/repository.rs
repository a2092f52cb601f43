use super::metadata_store::MetadataStore;
use super::upload_client::BlobUploader;
use crate::error::TrackerError;
use crate::models::{Document, NewDocument};
use std::sync::Arc;
use validator::Validate;

/// Next id for a collection: one past the highest id ever present, so ids
/// freed by deletes are not handed out again while a higher id exists.
pub fn next_id(documents: &[Document]) -> u64 {
    documents.iter().map(|d| d.id).max().unwrap_or(0) + 1
}

/// List/create/delete over the blob uploader and the metadata store.
///
/// Deleting a document only removes its record; the blob stays where it is.
/// A metadata failure after a successful upload leaves the blob orphaned and
/// is reported as [`TrackerError::Metadata`].
#[derive(Clone)]
pub struct DocumentRepository {
    store: Arc<dyn MetadataStore>,
    uploader: Arc<dyn BlobUploader>,
}

impl DocumentRepository {
    pub fn new(store: Arc<dyn MetadataStore>, uploader: Arc<dyn BlobUploader>) -> Self {
        Self { store, uploader }
    }

    pub async fn list(&self) -> Result<Vec<Document>, TrackerError> {
        self.store.list_all().await
    }

    pub async fn create(&self, input: NewDocument) -> Result<Document, TrackerError> {
        let file = match input.file.as_ref() {
            Some(file) if !file.is_empty() => file,
            _ => {
                return Err(TrackerError::Validation(
                    "Please select a file to upload".to_string(),
                ))
            }
        };
        input.validate()?;

        tracing::info!(file_name = %file.name, size = file.bytes.len(), "Document upload started");

        let blob = self.uploader.upload(file).await.map_err(|e| {
            tracing::error!(file_name = %file.name, error = %e, "Document upload failed");
            match e {
                TrackerError::Upload(_) | TrackerError::Validation(_) => e,
                other => TrackerError::Upload(other.to_string()),
            }
        })?;

        let metadata_stage = |e: TrackerError| {
            tracing::error!(
                file_name = %file.name,
                file_url = %blob.url,
                error = %e,
                "Blob stored but document metadata was not saved"
            );
            TrackerError::Metadata(e.to_string())
        };

        let mut documents = self.store.list_all().await.map_err(metadata_stage)?;

        let document = Document {
            id: next_id(&documents),
            name: input.name.clone(),
            division: input.division,
            status: input.status,
            file_name: file.name.clone(),
            file_url: blob.url.clone(),
        };
        documents.push(document.clone());

        self.store
            .replace_all(&documents)
            .await
            .map_err(metadata_stage)?;

        tracing::info!(document_id = document.id, file_url = %document.file_url, "Document created");
        Ok(document)
    }

    pub async fn delete(&self, id: u64) -> Result<(), TrackerError> {
        let documents = self.store.list_all().await?;
        let before = documents.len();

        let remaining: Vec<Document> = documents.into_iter().filter(|d| d.id != id).collect();
        if remaining.len() == before {
            tracing::warn!(document_id = id, "Delete requested for unknown document");
            return Err(TrackerError::NotFound(id));
        }

        self.store.replace_all(&remaining).await?;

        tracing::info!(document_id = id, "Document deleted");
        Ok(())
    }
}
