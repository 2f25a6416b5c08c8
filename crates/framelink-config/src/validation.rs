// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Collects every problem before failing so one run reports them all.

use crate::{ConfigError, ConfigResult, LinkConfig};

/// Largest `link.read_chunk_size` the link driver accepts
pub const MAX_READ_CHUNK_SIZE: usize = 256;

/// Accepted `logging.level` values
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Accepted `logging.format` values
pub const LOG_FORMATS: &[&str] = &["text", "json"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    OutOfRange {
        field: String,
        value: u64,
        min: u64,
        max: u64,
    },
    InvalidValue {
        field: String,
        reason: String,
    },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(
                f,
                "{} = {} is outside valid range ({}-{})",
                field, value, min, max
            ),
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - `max_payload + 1` fitting the 16-bit length field
/// - `read_chunk_size` within `1..=256`
/// - Known log level and format
///
/// Equal header and trailer magics are legal but make resynchronization
/// weaker, so they only produce a warning.
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every failed check
pub fn validate_config(config: &LinkConfig) -> ConfigResult<()> {
    let errors = collect_errors(config);

    if config.protocol.header_magic == config.protocol.trailer_magic {
        tracing::warn!(
            magic = config.protocol.header_magic,
            "header and trailer magic are identical"
        );
    }

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

/// Run every check and return the failures.
pub fn collect_errors(config: &LinkConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_protocol(config, &mut errors);
    validate_link(config, &mut errors);
    validate_logging(config, &mut errors);
    errors
}

fn validate_protocol(config: &LinkConfig, errors: &mut Vec<ConfigValidationError>) {
    let max = (u16::MAX - 1) as u64;
    if config.protocol.max_payload as u64 > max {
        errors.push(ConfigValidationError::OutOfRange {
            field: "protocol.max_payload".to_string(),
            value: config.protocol.max_payload as u64,
            min: 0,
            max,
        });
    }
}

fn validate_link(config: &LinkConfig, errors: &mut Vec<ConfigValidationError>) {
    let size = config.link.read_chunk_size;
    if size == 0 || size > MAX_READ_CHUNK_SIZE {
        errors.push(ConfigValidationError::OutOfRange {
            field: "link.read_chunk_size".to_string(),
            value: size as u64,
            min: 1,
            max: MAX_READ_CHUNK_SIZE as u64,
        });
    }
}

fn validate_logging(config: &LinkConfig, errors: &mut Vec<ConfigValidationError>) {
    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!(
                "'{}' is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }
    if !LOG_FORMATS.contains(&config.logging.format.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.format".to_string(),
            reason: format!(
                "'{}' is not one of {}",
                config.logging.format,
                LOG_FORMATS.join(", ")
            ),
        });
    }
}
