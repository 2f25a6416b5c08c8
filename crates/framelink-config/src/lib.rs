// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # framelink Configuration
//!
//! Type-safe configuration for a framelink endpoint with support for:
//! - TOML file parsing (`framelink.toml`)
//! - Environment variable overrides (`FRAMELINK_*`)
//! - CLI argument overrides (dotted keys such as `protocol.max_payload`)
//!
//! Both ends of a link must agree on every `[protocol]` value.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use framelink_config::load_config;
//!
//! let config = load_config(None, None).expect("Failed to load config");
//! let frame_config = config.frame_config();
//! println!("max payload: {}", frame_config.max_payload);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(feature = "std")]
pub mod loader;

pub mod types;
pub mod validation;

#[cfg(feature = "std")]
pub use loader::{
    apply_cli_overrides, apply_environment_overrides, find_config_file, load_config,
    load_config_or_default, parse_magic, CONFIG_FILE_NAME, CONFIG_PATH_ENV,
};

pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

#[cfg(feature = "std")]
impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
