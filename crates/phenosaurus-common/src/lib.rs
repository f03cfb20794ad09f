//! phenosaurus-common — Shared configuration, errors and user-facing messages
//! used across all Phenosaurus crates.

pub mod config;
pub mod error;
pub mod messages;

// Re-export commonly used types
pub use config::{AuthConfig, Config, DatabaseConfig, DisplayConfig, ServerConfig};
pub use error::{ApiError, PhenoError, Result};
