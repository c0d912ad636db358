//! ConLearn Core Library
//!
//! Domain models, error types and configuration shared by the API server,
//! the storage and database layers, and the client crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

pub use config::{BaseConfig, Config, UploadServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
