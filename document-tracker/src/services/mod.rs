pub mod metadata_store;
pub mod metrics;
pub mod repository;
pub mod upload_client;

pub use metadata_store::{JsonBinStore, LocalFileStore, MetadataStore};
pub use repository::DocumentRepository;
pub use upload_client::{BlobUploader, GatewayUploadClient, UploadMode, UploadedBlob};
