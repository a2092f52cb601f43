//! UI state owner.
//!
//! `AppController` holds the single `UiState` of this process and sequences
//! the loading/submitting flags around repository calls. The state lock is
//! released while a repository call is in flight, so a concurrent submission
//! sees `is_submitting` and is ignored instead of queued.

pub mod preview_cache;
pub mod state;

pub use preview_cache::PreviewCache;
pub use state::{Notification, NotificationKind, UiState};

use crate::error::TrackerError;
use crate::models::{Document, Filters, NewDocument, UploadFile, ViewMode};
use crate::services::metrics::record_operation;
use crate::services::DocumentRepository;
use tokio::sync::RwLock;

/// Result of a create/delete submission that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Completed,
    /// Another submission was already in flight; nothing was sent.
    Ignored,
}

/// What "open" resolves to for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    Cached(UploadFile),
    Remote(String),
}

pub struct AppController {
    repository: DocumentRepository,
    state: RwLock<UiState>,
    previews: PreviewCache,
}

impl AppController {
    pub fn new(repository: DocumentRepository) -> Self {
        Self {
            repository,
            state: RwLock::new(UiState::default()),
            previews: PreviewCache::default(),
        }
    }

    pub async fn snapshot(&self) -> UiState {
        self.state.read().await.clone()
    }

    /// Fetch the full collection into state. On failure the list is cleared
    /// and the page-level error is set.
    pub async fn load(&self) -> Result<(), TrackerError> {
        {
            let mut state = self.state.write().await;
            state.is_loading = true;
            state.error_message = None;
        }

        let result = self.repository.list().await;

        let mut state = self.state.write().await;
        state.is_loading = false;
        match result {
            Ok(documents) => {
                tracing::debug!(count = documents.len(), "Documents loaded");
                state.documents = documents;
                state.error_message = None;
                record_operation("load", "success");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load documents");
                state.documents.clear();
                state.error_message = Some(e.to_string());
                record_operation("load", e.kind());
                Err(e)
            }
        }
    }

    pub async fn set_filters(&self, filters: Filters) {
        self.state.write().await.filters = filters;
    }

    pub async fn set_search(&self, search: impl Into<String>) {
        self.state.write().await.filters.search = search.into();
    }

    pub async fn set_view(&self, view: ViewMode) {
        self.state.write().await.current_view = view;
    }

    pub async fn open_upload_modal(&self) {
        self.state.write().await.show_upload_modal = true;
    }

    pub async fn close_upload_modal(&self) {
        let mut state = self.state.write().await;
        state.show_upload_modal = false;
        state.is_submitting = false;
    }

    /// Select `id` as the delete target; the modal shows while one is set.
    pub async fn request_delete(&self, id: u64) -> Result<(), TrackerError> {
        let mut state = self.state.write().await;
        let target = state
            .documents
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or(TrackerError::NotFound(id))?;
        state.document_to_delete = Some(target);
        Ok(())
    }

    pub async fn close_delete_modal(&self) {
        let mut state = self.state.write().await;
        state.document_to_delete = None;
        state.is_submitting = false;
    }

    pub async fn notify(&self, notification: Notification) {
        self.state.write().await.notification = Some(notification);
    }

    pub async fn dismiss_notification(&self) {
        self.state.write().await.notification = None;
    }

    /// Claim the single submission slot. `false` if it is already taken.
    async fn begin_submit(&self) -> bool {
        let mut state = self.state.write().await;
        if state.is_submitting {
            return false;
        }
        state.is_submitting = true;
        true
    }

    async fn fail_submit(&self, operation: &'static str, error: &TrackerError) {
        let mut state = self.state.write().await;
        state.is_submitting = false;
        state.notification = Some(Notification::error(error.to_string()));
        record_operation(operation, error.kind());
    }

    pub async fn submit_create(&self, input: NewDocument) -> Result<SubmitOutcome, TrackerError> {
        if !self.begin_submit().await {
            tracing::debug!("Create ignored: a submission is already in flight");
            return Ok(SubmitOutcome::Ignored);
        }

        let file = input.file.clone();
        let document = match self.repository.create(input).await {
            Ok(document) => document,
            Err(e) => {
                self.fail_submit("create", &e).await;
                return Err(e);
            }
        };

        if let Some(file) = file {
            self.previews.insert(document.id, file).await;
        }

        {
            let mut state = self.state.write().await;
            state.show_upload_modal = false;
            state.is_submitting = false;
            state.notification = Some(Notification::success(format!(
                "Uploaded \"{}\"",
                document.name
            )));
        }
        record_operation("create", "success");

        // Re-fetch the canonical list instead of appending locally.
        let _ = self.load().await;
        Ok(SubmitOutcome::Completed)
    }

    /// Delete the selected document. `acknowledged` is the explicit
    /// confirmation from the dialog; without it nothing is sent.
    pub async fn confirm_delete(&self, acknowledged: bool) -> Result<SubmitOutcome, TrackerError> {
        let target = {
            let mut state = self.state.write().await;
            if state.is_submitting {
                tracing::debug!("Delete ignored: a submission is already in flight");
                return Ok(SubmitOutcome::Ignored);
            }
            let target = match (state.document_to_delete.clone(), acknowledged) {
                (Some(target), true) => target,
                (target, _) => {
                    let message = if target.is_none() {
                        "No document selected for deletion"
                    } else {
                        "Please confirm that you want to delete this document"
                    };
                    state.notification = Some(Notification::error(message));
                    return Err(TrackerError::Validation(message.to_string()));
                }
            };
            state.is_submitting = true;
            target
        };

        if let Err(e) = self.repository.delete(target.id).await {
            self.fail_submit("delete", &e).await;
            return Err(e);
        }

        self.previews.remove(target.id).await;
        {
            let mut state = self.state.write().await;
            state.document_to_delete = None;
            state.is_submitting = false;
            state.notification = Some(Notification::success(format!(
                "Deleted \"{}\"",
                target.name
            )));
        }
        record_operation("delete", "success");

        let _ = self.load().await;
        Ok(SubmitOutcome::Completed)
    }

    /// Cached bytes for documents uploaded by this process, else the stored URL.
    pub async fn open_document(&self, id: u64) -> Result<Preview, TrackerError> {
        if let Some(file) = self.previews.get(id).await {
            return Ok(Preview::Cached(file));
        }

        self.state
            .read()
            .await
            .documents
            .iter()
            .find(|d| d.id == id)
            .map(|d: &Document| Preview::Remote(d.file_url.clone()))
            .ok_or(TrackerError::NotFound(id))
    }
}
