pub mod config;
pub mod controller;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod views;

use controller::AppController;
use std::sync::Arc;

/// Shared application state: the single UI state owner of this process.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<AppController>,
}

impl AppState {
    pub fn new(controller: Arc<AppController>) -> Self {
        Self { controller }
    }
}
