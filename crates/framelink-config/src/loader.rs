// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later tiers win:
//! 1. TOML file (base values, defaults for missing keys)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::validation::validate_config;
use crate::{ConfigError, ConfigResult, LinkConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "framelink.toml";

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "FRAMELINK_CONFIG_PATH";

/// Find the framelink configuration file
///
/// Search order:
/// 1. `FRAMELINK_CONFIG_PATH` environment variable
/// 2. Current working directory: `./framelink.toml`
/// 3. Parent directories (up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by {} not found: {}",
            CONFIG_PATH_ENV,
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet {} to specify a custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration from a TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, the file is searched for.
/// * `cli_args` - Optional CLI overrides keyed by dotted path (`protocol.max_payload`)
///
/// # Errors
///
/// Returns error if the config file is not found, contains invalid TOML, or
/// fails validation
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<LinkConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let config: LinkConfig = toml::from_str(&content)?;
    tracing::debug!(path = %config_file.display(), "loaded configuration file");

    finish(config, cli_args)
}

/// Like [`load_config`], but start from defaults when no file can be found.
///
/// An explicit `config_path` that does not exist is still an error.
pub fn load_config_or_default(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<LinkConfig> {
    if config_path.is_some() {
        return load_config(config_path, cli_args);
    }
    match find_config_file() {
        Ok(path) => load_config(Some(&path), cli_args),
        Err(ConfigError::FileNotFound(_)) if env::var_os(CONFIG_PATH_ENV).is_none() => {
            tracing::debug!("no configuration file found, using defaults");
            finish(LinkConfig::default(), cli_args)
        }
        Err(e) => Err(e),
    }
}

fn finish(
    mut config: LinkConfig,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<LinkConfig> {
    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }
    validate_config(&config)?;
    Ok(config)
}

/// Parse a magic number given as `0x`-prefixed hex or decimal.
pub fn parse_magic(value: &str) -> Option<u16> {
    let value = value.trim();
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u16::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

/// Parse a boolean flag: `true/false`, `1/0` or `yes/no`, any case.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `FRAMELINK_HEADER_MAGIC` -> `protocol.header_magic`
/// - `FRAMELINK_TRAILER_MAGIC` -> `protocol.trailer_magic`
/// - `FRAMELINK_MAX_PAYLOAD` -> `protocol.max_payload`
/// - `FRAMELINK_CHECKSUM_ENABLED` -> `protocol.checksum_enabled`
/// - `FRAMELINK_READ_CHUNK_SIZE` -> `link.read_chunk_size`
/// - `FRAMELINK_RX_TIMEOUT_MS` -> `link.rx_timeout_ms`
/// - `FRAMELINK_LOG_LEVEL` -> `logging.level`
/// - `FRAMELINK_LOG_FORMAT` -> `logging.format`
///
/// Values that fail to parse are ignored with a warning.
pub fn apply_environment_overrides(config: &mut LinkConfig) {
    if let Ok(value) = env::var("FRAMELINK_HEADER_MAGIC") {
        match parse_magic(&value) {
            Some(magic) => config.protocol.header_magic = magic,
            None => ignored("FRAMELINK_HEADER_MAGIC", &value),
        }
    }
    if let Ok(value) = env::var("FRAMELINK_TRAILER_MAGIC") {
        match parse_magic(&value) {
            Some(magic) => config.protocol.trailer_magic = magic,
            None => ignored("FRAMELINK_TRAILER_MAGIC", &value),
        }
    }
    if let Ok(value) = env::var("FRAMELINK_MAX_PAYLOAD") {
        match value.parse::<usize>() {
            Ok(max) => config.protocol.max_payload = max,
            Err(_) => ignored("FRAMELINK_MAX_PAYLOAD", &value),
        }
    }
    if let Ok(value) = env::var("FRAMELINK_CHECKSUM_ENABLED") {
        match parse_flag(&value) {
            Some(enabled) => config.protocol.checksum_enabled = enabled,
            None => ignored("FRAMELINK_CHECKSUM_ENABLED", &value),
        }
    }

    if let Ok(value) = env::var("FRAMELINK_READ_CHUNK_SIZE") {
        match value.parse::<usize>() {
            Ok(size) => config.link.read_chunk_size = size,
            Err(_) => ignored("FRAMELINK_READ_CHUNK_SIZE", &value),
        }
    }
    if let Ok(value) = env::var("FRAMELINK_RX_TIMEOUT_MS") {
        match value.parse::<u64>() {
            Ok(ms) => config.link.rx_timeout_ms = ms,
            Err(_) => ignored("FRAMELINK_RX_TIMEOUT_MS", &value),
        }
    }

    if let Ok(value) = env::var("FRAMELINK_LOG_LEVEL") {
        config.logging.level = value.to_lowercase();
    }
    if let Ok(value) = env::var("FRAMELINK_LOG_FORMAT") {
        config.logging.format = value.to_lowercase();
    }
}

fn ignored(var: &str, value: &str) {
    tracing::warn!(var, value, "ignoring unparseable environment override");
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Overrides keyed by dotted path, e.g.
///   `{"protocol.max_payload": "512", "logging.level": "debug"}`
///
/// # Errors
///
/// Unlike environment overrides, an explicit CLI value that does not parse
/// or names an unknown key is an error.
pub fn apply_cli_overrides(
    config: &mut LinkConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    for (key, value) in cli_args {
        let invalid = || ConfigError::InvalidValue(format!("{} = {}", key, value));
        match key.as_str() {
            "protocol.header_magic" => {
                config.protocol.header_magic = parse_magic(value).ok_or_else(invalid)?;
            }
            "protocol.trailer_magic" => {
                config.protocol.trailer_magic = parse_magic(value).ok_or_else(invalid)?;
            }
            "protocol.max_payload" => {
                config.protocol.max_payload = value.parse().map_err(|_| invalid())?;
            }
            "protocol.checksum_enabled" => {
                config.protocol.checksum_enabled = parse_flag(value).ok_or_else(invalid)?;
            }
            "link.read_chunk_size" => {
                config.link.read_chunk_size = value.parse().map_err(|_| invalid())?;
            }
            "link.rx_timeout_ms" => {
                config.link.rx_timeout_ms = value.parse().map_err(|_| invalid())?;
            }
            "logging.level" => config.logging.level = value.to_lowercase(),
            "logging.format" => config.logging.format = value.to_lowercase(),
            _ => {
                return Err(ConfigError::InvalidValue(format!(
                    "unknown configuration key '{}'",
                    key
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const OVERRIDE_VARS: &[&str] = &[
        "FRAMELINK_HEADER_MAGIC",
        "FRAMELINK_TRAILER_MAGIC",
        "FRAMELINK_MAX_PAYLOAD",
        "FRAMELINK_CHECKSUM_ENABLED",
        "FRAMELINK_READ_CHUNK_SIZE",
        "FRAMELINK_RX_TIMEOUT_MS",
        "FRAMELINK_LOG_LEVEL",
        "FRAMELINK_LOG_FORMAT",
    ];

    fn clear_env() {
        for var in OVERRIDE_VARS {
            env::remove_var(var);
        }
        env::remove_var(CONFIG_PATH_ENV);
    }

    #[test]
    fn test_parse_magic() {
        assert_eq!(parse_magic("0xAA55"), Some(0xAA55));
        assert_eq!(parse_magic("0X7e7e"), Some(0x7E7E));
        assert_eq!(parse_magic("43605"), Some(0xAA55));
        assert_eq!(parse_magic(" 0x55aa "), Some(0x55AA));
        assert_eq!(parse_magic("0x10000"), None);
        assert_eq!(parse_magic("magic"), None);
    }

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom.toml");
        File::create(&config_path).unwrap();

        env::set_var(CONFIG_PATH_ENV, config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var(CONFIG_PATH_ENV);

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_file_env_var_missing() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        env::set_var(CONFIG_PATH_ENV, "/nonexistent/framelink.toml");
        let result = find_config_file();
        env::remove_var(CONFIG_PATH_ENV);

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_partial_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_env();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[protocol]").unwrap();
        writeln!(file, "header_magic = 0x7E7E").unwrap();
        writeln!(file, "max_payload = 64").unwrap();
        writeln!(file, "[link]").unwrap();
        writeln!(file, "rx_timeout_ms = 50").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.protocol.header_magic, 0x7E7E);
        assert_eq!(config.protocol.trailer_magic, 0x55AA);
        assert_eq!(config.protocol.max_payload, 64);
        assert!(config.protocol.checksum_enabled);
        assert_eq!(config.link.rx_timeout_ms, 50);
        assert_eq!(config.link.read_chunk_size, 64);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_invalid_toml() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_env();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[protocol\nmax_payload = ").unwrap();

        let result = load_config(Some(&config_path), None);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_env();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[protocol]\nmax_payload = 70000\n").unwrap();

        let result = load_config(Some(&config_path), None);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            load_config_or_default(Some(&missing), None),
            Err(ConfigError::IoError(_))
        ));
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_env();
        let mut config = LinkConfig::default();

        env::set_var("FRAMELINK_HEADER_MAGIC", "0x1234");
        env::set_var("FRAMELINK_TRAILER_MAGIC", "22136");
        env::set_var("FRAMELINK_MAX_PAYLOAD", "128");
        env::set_var("FRAMELINK_CHECKSUM_ENABLED", "no");
        env::set_var("FRAMELINK_RX_TIMEOUT_MS", "10");
        env::set_var("FRAMELINK_LOG_LEVEL", "DEBUG");

        apply_environment_overrides(&mut config);
        clear_env();

        assert_eq!(config.protocol.header_magic, 0x1234);
        assert_eq!(config.protocol.trailer_magic, 0x5678);
        assert_eq!(config.protocol.max_payload, 128);
        assert!(!config.protocol.checksum_enabled);
        assert_eq!(config.link.rx_timeout_ms, 10);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_unparseable_environment_override_is_ignored() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_env();
        let mut config = LinkConfig::default();

        env::set_var("FRAMELINK_MAX_PAYLOAD", "lots");
        env::set_var("FRAMELINK_HEADER_MAGIC", "0xZZZZ");
        apply_environment_overrides(&mut config);
        clear_env();

        assert_eq!(config, LinkConfig::default());
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" yes "), Some(true));
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("False"), Some(false));
        assert_eq!(parse_flag("NO"), Some(false));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("ture"), None);
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    fn test_unparseable_checksum_flag_in_environment_keeps_value() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_env();
        let mut config = LinkConfig::default();

        env::set_var("FRAMELINK_CHECKSUM_ENABLED", "banana");
        apply_environment_overrides(&mut config);
        clear_env();

        assert!(config.protocol.checksum_enabled);
    }

    #[test]
    fn test_cli_checksum_flag() {
        let mut config = LinkConfig::default();

        let mut typo = HashMap::new();
        typo.insert("protocol.checksum_enabled".to_string(), "ture".to_string());
        assert!(matches!(
            apply_cli_overrides(&mut config, &typo),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(config.protocol.checksum_enabled);

        let mut off = HashMap::new();
        off.insert("protocol.checksum_enabled".to_string(), "False".to_string());
        apply_cli_overrides(&mut config, &off).unwrap();
        assert!(!config.protocol.checksum_enabled);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LinkConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("protocol.max_payload".to_string(), "32".to_string());
        cli_args.insert("protocol.trailer_magic".to_string(), "0x0D0A".to_string());
        cli_args.insert("link.read_chunk_size".to_string(), "16".to_string());

        apply_cli_overrides(&mut config, &cli_args).unwrap();

        assert_eq!(config.protocol.max_payload, 32);
        assert_eq!(config.protocol.trailer_magic, 0x0D0A);
        assert_eq!(config.link.read_chunk_size, 16);
    }

    #[test]
    fn test_cli_override_errors() {
        let mut config = LinkConfig::default();

        let mut bad_value = HashMap::new();
        bad_value.insert("protocol.max_payload".to_string(), "big".to_string());
        assert!(matches!(
            apply_cli_overrides(&mut config, &bad_value),
            Err(ConfigError::InvalidValue(_))
        ));

        let mut unknown_key = HashMap::new();
        unknown_key.insert("protocol.baud".to_string(), "9600".to_string());
        assert!(matches!(
            apply_cli_overrides(&mut config, &unknown_key),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_env();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[protocol]").unwrap();
        writeln!(file, "max_payload = 100").unwrap();
        writeln!(file, "header_magic = 0x1111").unwrap();

        env::set_var("FRAMELINK_MAX_PAYLOAD", "200");
        env::set_var("FRAMELINK_HEADER_MAGIC", "0x2222");

        let mut cli_args = HashMap::new();
        cli_args.insert("protocol.max_payload".to_string(), "300".to_string());

        let config = load_config(Some(&config_path), Some(&cli_args)).unwrap();
        clear_env();

        // CLI wins for max_payload, env wins for header_magic (no CLI override)
        assert_eq!(config.protocol.max_payload, 300);
        assert_eq!(config.protocol.header_magic, 0x2222);
    }
}
