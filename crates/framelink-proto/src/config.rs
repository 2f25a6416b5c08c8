// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Frame configuration.
//!
//! All four values must be identical on both ends of a link.

use crate::error::ConfigError;

/// Default header magic (`AA 55` on the wire).
pub const DEFAULT_HEADER_MAGIC: u16 = 0xAA55;

/// Default trailer magic (`55 AA` on the wire).
pub const DEFAULT_TRAILER_MAGIC: u16 = 0x55AA;

/// Default maximum payload length in bytes.
pub const DEFAULT_MAX_PAYLOAD: usize = 256;

/// Bytes added around the payload when the checksum is enabled:
/// header(2) + length(2) + command(1) + crc(2) + trailer(2).
pub const FRAME_OVERHEAD: usize = 9;

/// Bytes added around the payload when the checksum is disabled.
pub const FRAME_OVERHEAD_NO_CRC: usize = 7;

/// Largest frame produced under the default configuration.
pub const DEFAULT_MAX_FRAME_LEN: usize = DEFAULT_MAX_PAYLOAD + FRAME_OVERHEAD;

/// Largest value the 16-bit length field can carry.
const MAX_LENGTH_FIELD: usize = u16::MAX as usize;

/// Immutable protocol parameters shared by encoder and decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FrameConfig {
    /// Two-byte start-of-frame marker
    pub header_magic: u16,
    /// Two-byte end-of-frame marker
    pub trailer_magic: u16,
    /// Maximum payload length (command byte excluded)
    pub max_payload: usize,
    /// Whether frames carry and verify a CRC16
    pub checksum_enabled: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            header_magic: DEFAULT_HEADER_MAGIC,
            trailer_magic: DEFAULT_TRAILER_MAGIC,
            max_payload: DEFAULT_MAX_PAYLOAD,
            checksum_enabled: true,
        }
    }
}

impl FrameConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set header magic
    pub fn with_header_magic(mut self, magic: u16) -> Self {
        self.header_magic = magic;
        self
    }

    /// Set trailer magic
    pub fn with_trailer_magic(mut self, magic: u16) -> Self {
        self.trailer_magic = magic;
        self
    }

    /// Set maximum payload length
    pub fn with_max_payload(mut self, max_payload: usize) -> Self {
        self.max_payload = max_payload;
        self
    }

    /// Enable or disable checksum generation and verification
    pub fn with_checksum(mut self, enabled: bool) -> Self {
        self.checksum_enabled = enabled;
        self
    }

    /// Header magic as it appears on the wire.
    #[inline]
    pub fn header_bytes(&self) -> [u8; 2] {
        self.header_magic.to_be_bytes()
    }

    /// Trailer magic as it appears on the wire.
    #[inline]
    pub fn trailer_bytes(&self) -> [u8; 2] {
        self.trailer_magic.to_be_bytes()
    }

    /// Framing bytes added around a payload under this config.
    #[inline]
    pub fn overhead(&self) -> usize {
        if self.checksum_enabled {
            FRAME_OVERHEAD
        } else {
            FRAME_OVERHEAD_NO_CRC
        }
    }

    /// Exact wire size of a frame carrying `payload_len` bytes.
    #[inline]
    pub fn encoded_len(&self, payload_len: usize) -> usize {
        self.overhead() + payload_len
    }

    /// Wire size of the largest frame this config allows.
    #[inline]
    pub fn max_frame_len(&self) -> usize {
        self.encoded_len(self.max_payload)
    }

    /// Largest acceptable value of the length field (`max_payload + 1`).
    #[inline]
    pub fn max_length_field(&self) -> usize {
        self.max_payload + 1
    }

    /// Check that the config can be represented on the wire.
    ///
    /// The length field is 16 bits and counts the command byte, so
    /// `max_payload` may be at most `u16::MAX - 1`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_payload >= MAX_LENGTH_FIELD {
            return Err(ConfigError::MaxPayloadExceedsLengthField {
                max_payload: self.max_payload,
            });
        }
        Ok(())
    }

    pub(crate) fn check_payload_capacity(&self, capacity: usize) -> Result<(), ConfigError> {
        self.validate()?;
        if self.max_payload > capacity {
            return Err(ConfigError::MaxPayloadExceedsCapacity {
                max_payload: self.max_payload,
                capacity,
            });
        }
        Ok(())
    }

    pub(crate) fn check_frame_capacity(&self, capacity: usize) -> Result<(), ConfigError> {
        self.validate()?;
        let frame_len = self.max_frame_len();
        if frame_len > capacity {
            return Err(ConfigError::FrameExceedsCapacity {
                frame_len,
                capacity,
            });
        }
        Ok(())
    }
}
