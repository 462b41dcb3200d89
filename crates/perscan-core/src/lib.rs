//! Shared configuration and platform vocabulary for the perception scanner.

pub mod app_config;
pub mod config;
pub mod platform;

pub use app_config::{AppConfig, Environment, SourcesConfig};
pub use config::{load_app_config, load_app_config_from_env, load_sources_config};
pub use platform::Platform;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("unknown platform: {0}")]
    UnknownPlatform(String),
}
