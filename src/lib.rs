// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # framelink
//!
//! Framed byte-stream protocol for noisy serial-style links.
//!
//! Every frame carries a two-byte header magic, a big-endian length, a
//! command byte, the payload, an optional CRC-16/CCITT and a two-byte trailer
//! magic. The decoder consumes one byte at a time, drops corrupted frames
//! silently and resynchronizes on the next header.
//!
//! ## Crates
//!
//! - [`proto`]: checksum, encoder, decoder state machine (`no_std`)
//! - [`hal`]: transport and clock traits, the [`FrameLink`](hal::FrameLink) driver
//! - [`config`]: `framelink.toml` loading with environment and CLI overrides
//! - [`observability`]: logging setup for binaries
//!
//! ## Quick Start
//!
//! ```rust
//! use framelink::prelude::*;
//!
//! let mut encoder = FrameEncoder::with_default_config();
//! let frame = encoder.encode(0x10, &[0x02, 0x03])?.to_vec();
//!
//! let mut decoder = FrameDecoder::with_default_config(PacketCollector::new());
//! decoder.feed_slice(&frame);
//! assert_eq!(decoder.consumer().packets(), &[Packet::new(0x10, [0x02, 0x03])]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Wire Format
//!
//! ```text
//! ┌────────┬────────┬─────┬─────────────┬────────┬─────────┐
//! │ header │ length │ cmd │ payload     │ crc16  │ trailer │
//! │ 2 B    │ 2 B BE │ 1 B │ length-1 B  │ 2 B BE │ 2 B     │
//! └────────┴────────┴─────┴─────────────┴────────┴─────────┘
//! ```
//!
//! The CRC covers length, command and payload. `length` counts the command
//! byte plus the payload.

pub use framelink_config as config;
pub use framelink_hal as hal;
pub use framelink_observability as observability;
pub use framelink_proto as proto;

#[cfg(feature = "std")]
pub mod session;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::proto::{
        crc16_ccitt, Crc16, DecodeState, DecoderStats, EncodeError, FrameConfig, FrameDecoder,
        FrameEncoder, PacketConsumer, RejectReason,
    };

    #[cfg(feature = "std")]
    pub use crate::proto::{Packet, PacketCollector};

    pub use crate::hal::{FrameLink, LinkError, SerialIO, TimeProvider};

    #[cfg(feature = "std")]
    pub use crate::hal::{LoopbackSerial, StdClock};

    pub use crate::config::LinkConfig;
}
