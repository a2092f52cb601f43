use crate::models::{Document, Filters, ViewMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
        }
    }
}

/// Transient banner shown after a create/delete attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Everything the page shows. Rendering is a pure function of this.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub documents: Vec<Document>,
    pub current_view: ViewMode,
    pub filters: Filters,
    pub show_upload_modal: bool,
    pub document_to_delete: Option<Document>,
    pub is_loading: bool,
    /// Page-level error from the last list load.
    pub error_message: Option<String>,
    pub is_submitting: bool,
    pub notification: Option<Notification>,
}

impl UiState {
    pub fn visible_documents(&self) -> Vec<&Document> {
        self.filters.apply(&self.documents)
    }
}
