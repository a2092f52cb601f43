pub mod health;
pub mod upload;

pub use health::{health_check, metrics_endpoint};
pub use upload::{method_not_allowed, upload_blob};
