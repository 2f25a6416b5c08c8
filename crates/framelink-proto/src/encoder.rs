// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Frame encoder.
//!
//! Produces the exact inverse of what [`FrameDecoder`](crate::FrameDecoder)
//! accepts under the same [`FrameConfig`]. All multi-byte fields are written
//! big-endian.

use crate::checksum::crc16_ccitt;
use crate::config::{FrameConfig, DEFAULT_MAX_FRAME_LEN};
use crate::error::{ConfigError, EncodeError};

/// Encode one frame into `out`, returning the number of bytes written.
///
/// On error nothing is written.
///
/// # Errors
///
/// - [`EncodeError::PayloadTooLong`] if `payload` exceeds `config.max_payload`
///   or cannot be described by the 16-bit length field
/// - [`EncodeError::BufferTooSmall`] if `out` cannot hold the frame
///
/// # Example
///
/// ```
/// use framelink_proto::{encode_into, FrameConfig};
///
/// let mut buf = [0u8; 16];
/// let n = encode_into(&FrameConfig::default(), 0x10, &[0x02, 0x03], &mut buf).unwrap();
/// assert_eq!(&buf[..n], &[0xAA, 0x55, 0x00, 0x03, 0x10, 0x02, 0x03, 0x9F, 0xB2, 0x55, 0xAA]);
/// ```
pub fn encode_into(
    config: &FrameConfig,
    command: u8,
    payload: &[u8],
    out: &mut [u8],
) -> Result<usize, EncodeError> {
    let max = config.max_payload.min(u16::MAX as usize - 1);
    if payload.len() > max {
        return Err(EncodeError::PayloadTooLong {
            len: payload.len(),
            max,
        });
    }

    let needed = config.encoded_len(payload.len());
    if out.len() < needed {
        return Err(EncodeError::BufferTooSmall {
            needed,
            available: out.len(),
        });
    }

    // Bounded above, cannot truncate
    let length = (payload.len() + 1) as u16;

    out[0..2].copy_from_slice(&config.header_bytes());
    out[2..4].copy_from_slice(&length.to_be_bytes());
    out[4] = command;
    let mut index = 5;
    out[index..index + payload.len()].copy_from_slice(payload);
    index += payload.len();

    if config.checksum_enabled {
        // Span covers length ‖ command ‖ payload
        let crc = crc16_ccitt(&out[2..index]);
        out[index..index + 2].copy_from_slice(&crc.to_be_bytes());
        index += 2;
    }

    out[index..index + 2].copy_from_slice(&config.trailer_bytes());
    index += 2;

    debug_assert_eq!(index, needed);
    Ok(index)
}

/// Encoder owning a scratch buffer of `F` bytes.
///
/// Each call to [`encode`](Self::encode) overwrites the buffer and returns a
/// view of the new frame, valid until the next call.
pub struct FrameEncoder<const F: usize = DEFAULT_MAX_FRAME_LEN> {
    config: FrameConfig,
    buffer: [u8; F],
}

impl FrameEncoder {
    /// Encoder with the default configuration.
    pub fn with_default_config() -> Self {
        Self {
            config: FrameConfig::default(),
            buffer: [0; DEFAULT_MAX_FRAME_LEN],
        }
    }
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::with_default_config()
    }
}

impl<const F: usize> FrameEncoder<F> {
    /// Create an encoder.
    ///
    /// # Errors
    ///
    /// Fails if the largest frame allowed by `config` does not fit in `F`
    /// bytes, or if `config` is not representable on the wire.
    pub fn new(config: FrameConfig) -> Result<Self, ConfigError> {
        config.check_frame_capacity(F)?;
        Ok(Self {
            config,
            buffer: [0; F],
        })
    }

    /// Encode a frame into the internal buffer.
    pub fn encode(&mut self, command: u8, payload: &[u8]) -> Result<&[u8], EncodeError> {
        let len = encode_into(&self.config, command, payload, &mut self.buffer)?;
        Ok(&self.buffer[..len])
    }

    /// Active configuration
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Scratch buffer size `F`
    pub const fn capacity(&self) -> usize {
        F
    }
}

impl<const F: usize> core::fmt::Debug for FrameEncoder<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameEncoder")
            .field("config", &self.config)
            .field("capacity", &F)
            .finish()
    }
}
