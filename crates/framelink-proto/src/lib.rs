// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

//! # framelink-proto
//!
//! Transport-agnostic framed byte-stream protocol.
//!
//! This crate provides:
//! - **Checksum engine** (`checksum` module) - CRC-16/CCITT over the frame body
//! - **Frame encoder** (`encoder` module) - serializes `(command, payload)` into one frame
//! - **Frame decoder** (`decoder` module) - byte-at-a-time state machine with soft resynchronization
//!
//! The protocol layer does NOT handle:
//! - Moving bytes on/off the wire (that's the transport's job, see `framelink-hal`)
//! - Retransmission, fragmentation or stream multiplexing
//!
//! ## Wire Format
//!
//! ```text
//! ┌──────────┬──────────┬─────────┬──────────────┬──────────┬──────────┐
//! │ Header   │ Length   │ Command │ Payload      │ CRC16    │ Trailer  │
//! │ 2 bytes  │ 2 bytes  │ 1 byte  │ length-1     │ 2 bytes  │ 2 bytes  │
//! │ 0xAA55   │ u16 BE   │         │ bytes        │ optional │ 0x55AA   │
//! └──────────┴──────────┴─────────┴──────────────┴──────────┴──────────┘
//! ```
//!
//! `length = 1 + payload.len()`. The CRC covers `length ‖ command ‖ payload`.
//! All multi-byte integers are Big Endian.
//!
//! ## Example
//!
//! ```
//! use framelink_proto::{FrameConfig, FrameDecoder, FrameEncoder};
//!
//! let mut encoder = FrameEncoder::with_default_config();
//! let frame = encoder.encode(0x10, &[0x02, 0x03]).unwrap();
//!
//! let mut received = None;
//! let mut decoder: FrameDecoder<_> = FrameDecoder::new(FrameConfig::default(), |cmd: u8, payload: &[u8]| {
//!     received = Some((cmd, payload.len()));
//! })
//! .unwrap();
//! decoder.feed_slice(frame);
//! drop(decoder);
//!
//! assert_eq!(received, Some((0x10, 2)));
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CRC-16/CCITT checksum engine.
pub mod checksum;

/// Frame configuration shared by encoder and decoder.
pub mod config;

/// Packet consumer abstraction invoked by the decoder.
pub mod consumer;

/// Incremental frame decoder.
pub mod decoder;

/// Frame encoder.
pub mod encoder;

/// Error types.
pub mod error;

/// Decoder statistics.
pub mod stats;

pub use checksum::{crc16_ccitt, Crc16, CRC16_INIT, CRC16_POLY};
pub use config::{
    FrameConfig, DEFAULT_HEADER_MAGIC, DEFAULT_MAX_FRAME_LEN, DEFAULT_MAX_PAYLOAD,
    DEFAULT_TRAILER_MAGIC, FRAME_OVERHEAD, FRAME_OVERHEAD_NO_CRC,
};
pub use consumer::PacketConsumer;
#[cfg(feature = "std")]
pub use consumer::{Packet, PacketCollector};
pub use decoder::{DecodeState, FrameDecoder};
pub use encoder::{encode_into, FrameEncoder};
pub use error::{ConfigError, EncodeError, RejectReason};
pub use stats::DecoderStats;
