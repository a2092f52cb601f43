pub mod blob_store;
pub mod metrics;

pub use blob_store::{BlobStore, HttpBlobStore, LocalBlobStore, StoredBlob};
pub use metrics::{get_metrics, init_metrics, record_upload};
