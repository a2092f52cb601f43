pub mod app;
pub mod documents;
pub mod ui;
