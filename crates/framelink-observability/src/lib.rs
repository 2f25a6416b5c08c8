// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # framelink-observability
//!
//! Logging setup shared by framelink binaries.
//!
//! Library crates only emit `tracing` events; installing a subscriber is the
//! job of the binary, through [`init_logging`]. Per-crate debug output is
//! switched on with `--debug-<crate>` flags or the `FRAMELINK_DEBUG`
//! environment variable.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known framelink crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "framelink",
    "framelink-proto",
    "framelink-hal",
    "framelink-config",
];
