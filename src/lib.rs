pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod services;
pub mod store;
pub mod web;

/// Stamped by `build.rs`; rendered in the page footer.
pub const BUILD_ID: &str = env!("CLUBACTIV_BUILD_ID");
