//! service-core: Shared infrastructure for the document tracker workspace.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
