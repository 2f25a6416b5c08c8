// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to one section of `framelink.toml`. Missing keys fall
//! back to their defaults.

use framelink_proto::{FrameConfig, DEFAULT_HEADER_MAGIC, DEFAULT_MAX_PAYLOAD, DEFAULT_TRAILER_MAGIC};
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LinkConfig {
    pub protocol: ProtocolConfig,
    pub link: TransportConfig,
    pub logging: LoggingConfig,
}

impl LinkConfig {
    /// Protocol parameters for the encoder and decoder
    pub fn frame_config(&self) -> FrameConfig {
        FrameConfig::new()
            .with_header_magic(self.protocol.header_magic)
            .with_trailer_magic(self.protocol.trailer_magic)
            .with_max_payload(self.protocol.max_payload)
            .with_checksum(self.protocol.checksum_enabled)
    }

    /// Receive timeout in microseconds; 0 means disabled
    pub fn rx_timeout_us(&self) -> u64 {
        self.link.rx_timeout_ms.saturating_mul(1000)
    }
}

/// `[protocol]` - wire format parameters, must match on both ends
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProtocolConfig {
    pub header_magic: u16,
    pub trailer_magic: u16,
    pub max_payload: usize,
    pub checksum_enabled: bool,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            header_magic: DEFAULT_HEADER_MAGIC,
            trailer_magic: DEFAULT_TRAILER_MAGIC,
            max_payload: DEFAULT_MAX_PAYLOAD,
            checksum_enabled: true,
        }
    }
}

/// `[link]` - transport driver settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Bytes requested from the transport per poll
    pub read_chunk_size: usize,
    /// Discard a partial frame after this much silence; 0 disables
    pub rx_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: 64,
            rx_timeout_ms: 0,
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace | debug | info | warn | error
    pub level: String,
    /// text | json
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}
