pub mod upload;

pub use upload::{UploadParams, UploadResponse};
