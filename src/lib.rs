// Core modules
pub mod api;
pub mod config;
pub mod error;
pub mod indicators;
pub mod models;
pub mod service;
pub mod strategy;
pub mod synthetic;

// Re-export commonly used types
pub use error::SignalError;
pub use models::*;
pub use strategy::{ClassificationResult, LatestSnapshot, Strategy};

// Error handling
pub type Result<T> = std::result::Result<T, SignalError>;
