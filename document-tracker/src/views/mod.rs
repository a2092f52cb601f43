//! Askama view models.
//!
//! Every struct here is built from a `UiState` snapshot and nothing else, so
//! rendering the same state twice yields the same markup.

use crate::controller::UiState;
use crate::models::{Division, Document, DocumentStatus, ViewMode};
use askama::Template;

/// One `<option>` of a filter or form select.
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

fn choices<T: Copy + PartialEq>(
    all: &[T],
    current: Option<T>,
    label: impl Fn(&T) -> &'static str,
) -> Vec<SelectOption> {
    let mut options = vec![SelectOption {
        value: "all".to_string(),
        label: "All".to_string(),
        selected: current.is_none(),
    }];
    options.extend(all.iter().map(|item| SelectOption {
        value: label(item).to_string(),
        label: label(item).to_string(),
        selected: current == Some(*item),
    }));
    options
}

/// A document as the list shows it.
pub struct DocumentCard {
    pub id: u64,
    pub name: String,
    pub division: String,
    pub status: String,
    /// CSS modifier for the status badge.
    pub status_class: &'static str,
    pub file_name: String,
    pub open_url: String,
}

impl DocumentCard {
    fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id,
            name: doc.name.clone(),
            division: doc.division.to_string(),
            status: doc.status.to_string(),
            status_class: match doc.status {
                DocumentStatus::Approved => "badge-approved",
                DocumentStatus::Pending => "badge-pending",
                DocumentStatus::Rejected => "badge-rejected",
            },
            file_name: doc.file_name.clone(),
            open_url: format!("/documents/{}/open", doc.id),
        }
    }
}

/// Data of `partials/documents.html`.
pub struct DocumentListView {
    pub documents: Vec<DocumentCard>,
    pub is_grid: bool,
    pub is_loading: bool,
    pub has_error: bool,
    pub error_message: String,
    pub total: usize,
    pub filters_active: bool,
}

impl DocumentListView {
    pub fn from_state(state: &UiState) -> Self {
        let documents: Vec<DocumentCard> = state
            .visible_documents()
            .into_iter()
            .map(DocumentCard::from_document)
            .collect();

        Self {
            documents,
            is_grid: state.current_view == ViewMode::Grid,
            is_loading: state.is_loading,
            has_error: state.error_message.is_some(),
            error_message: state.error_message.clone().unwrap_or_default(),
            total: state.documents.len(),
            filters_active: state.filters.is_active(),
        }
    }
}

/// Everything on the full page outside the list.
pub struct PageView {
    pub division_filter: Vec<SelectOption>,
    pub status_filter: Vec<SelectOption>,
    pub division_choices: Vec<SelectOption>,
    pub status_choices: Vec<SelectOption>,
    pub search: String,
    pub is_grid: bool,
    pub show_upload_modal: bool,
    pub show_delete_modal: bool,
    pub delete_target_name: String,
    pub delete_target_file: String,
    pub is_submitting: bool,
    pub has_notification: bool,
    pub notification_kind: &'static str,
    pub notification_message: String,
}

impl PageView {
    pub fn from_state(state: &UiState) -> Self {
        // The upload form has no "All" entry and preselects the first value.
        let form_choices = |labels: Vec<&'static str>| -> Vec<SelectOption> {
            labels
                .into_iter()
                .enumerate()
                .map(|(i, label)| SelectOption {
                    value: label.to_string(),
                    label: label.to_string(),
                    selected: i == 0,
                })
                .collect()
        };

        let (delete_target_name, delete_target_file) = state
            .document_to_delete
            .as_ref()
            .map(|d| (d.name.clone(), d.file_name.clone()))
            .unwrap_or_default();

        Self {
            division_filter: choices(&Division::ALL, state.filters.division, |d| d.as_str()),
            status_filter: choices(&DocumentStatus::ALL, state.filters.status, |s| s.as_str()),
            division_choices: form_choices(Division::ALL.iter().map(|d| d.as_str()).collect()),
            status_choices: form_choices(
                DocumentStatus::ALL.iter().map(|s| s.as_str()).collect(),
            ),
            search: state.filters.search.clone(),
            is_grid: state.current_view == ViewMode::Grid,
            show_upload_modal: state.show_upload_modal,
            show_delete_modal: state.document_to_delete.is_some(),
            delete_target_name,
            delete_target_file,
            is_submitting: state.is_submitting,
            has_notification: state.notification.is_some(),
            notification_kind: state
                .notification
                .as_ref()
                .map(|n| n.kind.as_str())
                .unwrap_or(""),
            notification_message: state
                .notification
                .as_ref()
                .map(|n| n.message.clone())
                .unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub page: PageView,
    pub list: DocumentListView,
}

impl IndexTemplate {
    pub fn from_state(state: &UiState) -> Self {
        Self {
            page: PageView::from_state(state),
            list: DocumentListView::from_state(state),
        }
    }
}

/// The document list alone, swapped in by the filter bar and view toggle.
#[derive(Template)]
#[template(path = "partials/documents.html")]
pub struct DocumentsFragment {
    pub list: DocumentListView,
}

impl DocumentsFragment {
    pub fn from_state(state: &UiState) -> Self {
        Self {
            list: DocumentListView::from_state(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Notification;
    use crate::models::Filters;

    fn doc(id: u64, name: &str, division: Division, status: DocumentStatus) -> Document {
        Document {
            id,
            name: name.into(),
            division,
            status,
            file_name: format!("{}.pdf", name.to_lowercase()),
            file_url: format!("https://blob.test/{}.pdf", id),
        }
    }

    fn state() -> UiState {
        UiState {
            documents: vec![
                doc(1, "Budget", Division::Finance, DocumentStatus::Approved),
                doc(2, "Handbook", Division::HR, DocumentStatus::Rejected),
            ],
            ..UiState::default()
        }
    }

    #[test]
    fn list_follows_filters_and_view() {
        let mut state = state();
        state.filters = Filters::parse("HR", "all", "").unwrap();
        state.current_view = ViewMode::List;

        let list = DocumentListView::from_state(&state);
        assert_eq!(list.documents.len(), 1);
        assert_eq!(list.documents[0].id, 2);
        assert_eq!(list.documents[0].status_class, "badge-rejected");
        assert_eq!(list.total, 2);
        assert!(list.filters_active);
        assert!(!list.is_grid);
    }

    #[test]
    fn filter_options_mark_current_choice() {
        let mut state = state();
        state.filters = Filters::parse("all", "Pending", "").unwrap();

        let page = PageView::from_state(&state);
        assert!(page.division_filter[0].selected);
        let selected: Vec<&str> = page
            .status_filter
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(selected, vec!["Pending"]);
    }

    #[test]
    fn page_renders_modals_and_notification() {
        let mut state = state();
        state.document_to_delete = Some(state.documents[0].clone());
        state.notification = Some(Notification::error("Upload failed: boom"));

        let html = IndexTemplate::from_state(&state).render().unwrap();
        assert!(html.contains("Upload failed: boom"));
        assert!(html.contains("name=\"acknowledged\""));
        assert!(html.contains("Budget"));
        assert!(html.contains("/documents/2/open"));
    }

    #[test]
    fn list_updates_go_through_one_sequenced_request() {
        let html = IndexTemplate::from_state(&state()).render().unwrap();
        assert!(html.contains("var seq = ++listRequest;"));
        assert!(html.contains("seq !== listRequest"));
        assert!(html.contains("refreshList(\"/filters\""));
        assert!(html.contains("refreshList(\"/view\""));
        assert!(!html.contains(".then(swapList)"));
    }

    #[test]
    fn fragment_shows_empty_and_error_states() {
        let empty = DocumentsFragment::from_state(&UiState::default())
            .render()
            .unwrap();
        assert!(empty.contains("No documents yet"));

        let failed = UiState {
            error_message: Some("Failed to fetch documents (HTTP 500)".into()),
            ..UiState::default()
        };
        let html = DocumentsFragment::from_state(&failed).render().unwrap();
        assert!(html.contains("Failed to fetch documents (HTTP 500)"));
    }

    #[test]
    fn rendered_names_are_escaped() {
        let state = UiState {
            documents: vec![doc(1, "<script>", Division::HR, DocumentStatus::Pending)],
            ..UiState::default()
        };
        let html = DocumentsFragment::from_state(&state).render().unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
