//! rentdesk Core Library
//!
//! Domain models, error types, configuration, validation and credential
//! handling shared by the API client, the media uploader and the CLI.

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use auth::{AuthCredentials, CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use config::ClientConfig;
pub use error::{ApiError, ApiErrorKind, ErrorMetadata, LogLevel};
