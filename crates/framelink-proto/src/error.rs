// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for frame encoding and configuration.
//!
//! Decode-time failures are not errors at this layer: the decoder absorbs
//! them by resynchronizing and records a [`RejectReason`] in its statistics.

use core::fmt;

#[cfg(feature = "std")]
extern crate std;

/// Encoder failures. No bytes are produced when one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// Payload is longer than the configured `max_payload`
    PayloadTooLong {
        /// Offered payload length
        len: usize,
        /// Largest accepted payload length
        max: usize,
    },
    /// Output buffer cannot hold the encoded frame
    BufferTooSmall {
        /// Encoded frame length
        needed: usize,
        /// Output buffer length
        available: usize,
    },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PayloadTooLong { len, max } => {
                write!(f, "Payload too long: {} bytes (max: {})", len, max)
            }
            Self::BufferTooSmall { needed, available } => write!(
                f,
                "Output buffer too small: need {} bytes, have {}",
                needed, available
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodeError {}

/// Invalid combination of configuration and buffer capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_payload + 1` does not fit in the 16-bit length field
    MaxPayloadExceedsLengthField {
        /// Configured maximum payload
        max_payload: usize,
    },
    /// Decoder payload buffer is smaller than `max_payload`
    MaxPayloadExceedsCapacity {
        /// Configured maximum payload
        max_payload: usize,
        /// Decoder buffer capacity `N`
        capacity: usize,
    },
    /// Encoder scratch buffer is smaller than the largest frame
    FrameExceedsCapacity {
        /// Largest frame under the config
        frame_len: usize,
        /// Encoder buffer capacity `F`
        capacity: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxPayloadExceedsLengthField { max_payload } => write!(
                f,
                "max_payload {} does not fit the 16-bit length field (max: {})",
                max_payload,
                u16::MAX - 1
            ),
            Self::MaxPayloadExceedsCapacity {
                max_payload,
                capacity,
            } => write!(
                f,
                "max_payload {} exceeds decoder buffer capacity {}",
                max_payload, capacity
            ),
            Self::FrameExceedsCapacity {
                frame_len,
                capacity,
            } => write!(
                f,
                "max frame length {} exceeds encoder buffer capacity {}",
                frame_len, capacity
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Why the decoder abandoned a partial frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RejectReason {
    /// Second header byte did not match
    Header,
    /// Length field was zero or above `max_payload + 1`
    Length,
    /// Received CRC differs from the computed one
    Checksum,
    /// Trailer bytes did not match
    Trailer,
    /// Payload buffer refused a byte
    Overflow,
}

impl RejectReason {
    /// Short lowercase name, used as a log field.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Header => "header",
            RejectReason::Length => "length",
            RejectReason::Checksum => "checksum",
            RejectReason::Trailer => "trailer",
            RejectReason::Overflow => "overflow",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
