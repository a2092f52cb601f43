use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub filename: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub url: String,
    pub pathname: String,
    pub size: u64,
    pub content_type: String,
}
