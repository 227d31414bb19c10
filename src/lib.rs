//! Sarpras - School Equipment Loan Management System
//!
//! A Rust REST API server managing the full equipment loan lifecycle:
//! requests, approvals, extensions, returns with fines, and the automatic
//! blacklisting of severely overdue borrowers.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
