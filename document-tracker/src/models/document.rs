use crate::error::TrackerError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Division {
    HR,
    Finance,
    Engineering,
    Marketing,
}

impl Division {
    pub const ALL: [Division; 4] = [
        Division::HR,
        Division::Finance,
        Division::Engineering,
        Division::Marketing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Division::HR => "HR",
            Division::Finance => "Finance",
            Division::Engineering => "Engineering",
            Division::Marketing => "Marketing",
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Division {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Division::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TrackerError::Validation(format!("Unknown division: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DocumentStatus {
    Approved,
    Pending,
    Rejected,
}

impl DocumentStatus {
    pub const ALL: [DocumentStatus; 3] = [
        DocumentStatus::Approved,
        DocumentStatus::Pending,
        DocumentStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Approved => "Approved",
            DocumentStatus::Pending => "Pending",
            DocumentStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TrackerError::Validation(format!("Unknown status: {}", s)))
    }
}

/// A tracked document. Stored as one element of the JSON collection:
/// `{"id":1,"name":"..","division":"HR","status":"Pending","fileName":"..","fileUrl":".."}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: u64,
    pub name: String,
    pub division: Division,
    pub status: DocumentStatus,
    pub file_name: String,
    pub file_url: String,
}

/// A file as received from the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: Option<String>, bytes: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type,
            bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn content_type_or_default(&self) -> &str {
        self.content_type
            .as_deref()
            .unwrap_or("application/octet-stream")
    }
}

/// Input of the create operation.
#[derive(Debug, Clone, Validate)]
pub struct NewDocument {
    #[validate(length(min = 1, message = "Document name is required"))]
    pub name: String,
    pub division: Division,
    pub status: DocumentStatus,
    pub file: Option<UploadFile>,
}

impl NewDocument {
    pub fn new(
        name: impl Into<String>,
        division: Division,
        status: DocumentStatus,
        file: Option<UploadFile>,
    ) -> Self {
        Self {
            name: name.into().trim().to_string(),
            division,
            status,
            file,
        }
    }
}
