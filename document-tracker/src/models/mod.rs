pub mod document;
pub mod filters;

pub use document::{Division, Document, DocumentStatus, NewDocument, UploadFile};
pub use filters::{Filters, ViewMode};
