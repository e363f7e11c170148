//! Shared domain types and configuration for clipscout.
//!
//! Holds the `VideoRecord` model produced by source adapters, the session
//! lifecycle state machine, and the environment-backed `AppConfig` consumed
//! by the binaries.

mod app_config;
mod config;
pub mod session;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use session::SessionStatus;
pub use types::{Platform, VideoRecord};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
