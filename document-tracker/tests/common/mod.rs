#![allow(dead_code)]

use bytes::Bytes;
use document_tracker::controller::AppController;
use document_tracker::models::{Division, Document, DocumentStatus, NewDocument, UploadFile};
use document_tracker::services::{
    DocumentRepository, GatewayUploadClient, LocalFileStore, MetadataStore, UploadMode,
};
use document_tracker::AppState;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A tracker wired to a local metadata file and a mock upload gateway.
pub struct TestTracker {
    pub gateway: MockServer,
    pub store: Arc<LocalFileStore>,
    pub store_path: PathBuf,
    pub repository: DocumentRepository,
    pub controller: Arc<AppController>,
    _dir: TempDir,
}

impl TestTracker {
    pub async fn new() -> Self {
        Self::with_mode(UploadMode::Raw).await
    }

    pub async fn with_mode(mode: UploadMode) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store_path = dir.path().join("documents.json");
        let store = Arc::new(LocalFileStore::new(&store_path));
        let gateway = MockServer::start().await;

        let uploader = Arc::new(GatewayUploadClient::new(gateway.uri(), mode));
        let repository = DocumentRepository::new(store.clone(), uploader);
        let controller = Arc::new(AppController::new(repository.clone()));

        Self {
            gateway,
            store,
            store_path,
            repository,
            controller,
            _dir: dir,
        }
    }

    pub async fn seed(&self, documents: &[Document]) {
        self.store
            .replace_all(documents)
            .await
            .expect("Failed to seed documents");
    }

    pub async fn stored(&self) -> Vec<Document> {
        self.store.list_all().await.expect("Failed to read documents")
    }

    pub fn state(&self) -> AppState {
        AppState::new(self.controller.clone())
    }

    /// Gateway accepts every upload and answers with `url`.
    pub async fn gateway_accepts(&self, url: &str) {
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "url": url,
                "pathname": "abc/a.pdf",
                "size": 4,
                "contentType": "application/pdf"
            })))
            .mount(&self.gateway)
            .await;
    }
}

pub fn doc(id: u64) -> Document {
    Document {
        id,
        name: format!("Doc {}", id),
        division: Division::Finance,
        status: DocumentStatus::Pending,
        file_name: format!("doc{}.pdf", id),
        file_url: format!("https://blob.test/doc{}.pdf", id),
    }
}

pub fn pdf(name: &str) -> UploadFile {
    UploadFile::new(
        name,
        Some("application/pdf".to_string()),
        Bytes::from_static(b"%PDF"),
    )
}

pub fn new_document(name: &str, file: Option<UploadFile>) -> NewDocument {
    NewDocument::new(name, Division::Engineering, DocumentStatus::Approved, file)
}
