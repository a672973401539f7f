//! symws bridge
//!
//! Connects a library catalog front-end to SirsiDynix Symphony Web Services:
//! resolves per-title holdings (including bound-with parents) into display-ready
//! records and maps patron account operations onto symws calls.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
