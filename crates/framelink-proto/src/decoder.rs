// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Incremental frame decoder.
//!
//! Bytes are fed one at a time, in arrival order, from whatever drives the
//! transport (UART RX interrupt, USB CDC read loop, radio FIFO drain). Any
//! malformed byte returns the machine to header search without caller
//! involvement; a rejected frame never reaches the consumer.
//!
//! ```text
//! WaitHeader1 ─hdr_hi─▶ WaitHeader2 ─hdr_lo─▶ WaitLengthHi ─▶ WaitLengthLo ─ok─▶ WaitCommand
//!                                                                              │
//!        ┌──────────────── length == 1 ─────────────────────────────────────────┤
//!        │                                                                      ▼
//!        │                                                                  ReadData
//!        ▼                                                                      │
//!   WaitCrc1 ─▶ WaitCrc2 ─crc ok─▶ WaitEnd1 ─trl_hi─▶ WaitEnd2 ─trl_lo─▶ dispatch
//! ```
//!
//! With the checksum disabled the CRC states are skipped.

use heapless::Vec;

use crate::checksum::Crc16;
use crate::config::{FrameConfig, DEFAULT_MAX_PAYLOAD};
use crate::consumer::PacketConsumer;
use crate::error::{ConfigError, RejectReason};
use crate::stats::DecoderStats;

/// Decoder state. The machine has no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    /// Searching for the first header byte
    WaitHeader1,
    /// First header byte seen
    WaitHeader2,
    /// Expecting the length high byte
    WaitLengthHi,
    /// Expecting the length low byte
    WaitLengthLo,
    /// Expecting the command byte
    WaitCommand,
    /// Accumulating payload bytes
    ReadData,
    /// Expecting the CRC high byte
    WaitCrc1,
    /// Expecting the CRC low byte
    WaitCrc2,
    /// Expecting the first trailer byte
    WaitEnd1,
    /// Expecting the second trailer byte
    WaitEnd2,
}

impl DecodeState {
    /// State name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            DecodeState::WaitHeader1 => "WaitHeader1",
            DecodeState::WaitHeader2 => "WaitHeader2",
            DecodeState::WaitLengthHi => "WaitLengthHi",
            DecodeState::WaitLengthLo => "WaitLengthLo",
            DecodeState::WaitCommand => "WaitCommand",
            DecodeState::ReadData => "ReadData",
            DecodeState::WaitCrc1 => "WaitCrc1",
            DecodeState::WaitCrc2 => "WaitCrc2",
            DecodeState::WaitEnd1 => "WaitEnd1",
            DecodeState::WaitEnd2 => "WaitEnd2",
        }
    }
}

/// Per-stream decoder context.
///
/// `N` is the payload buffer capacity; the configured `max_payload` must not
/// exceed it. One decoder serves exactly one ordered byte stream and is not
/// reentrant: callers feeding from an interrupt must serialize access.
///
/// # Example
///
/// ```
/// use framelink_proto::{FrameConfig, FrameDecoder, PacketCollector};
///
/// let config = FrameConfig::default().with_max_payload(32);
/// let mut decoder = FrameDecoder::<_, 32>::new(config, PacketCollector::new()).unwrap();
///
/// decoder.feed_slice(&[0x00, 0x13, 0xAA, 0x55, 0x00, 0x01, 0x01, 0xEF, 0x8C, 0x55, 0xAA]);
///
/// let packets = decoder.consumer().packets();
/// assert_eq!(packets.len(), 1);
/// assert_eq!(packets[0].command, 0x01);
/// assert!(packets[0].payload.is_empty());
/// ```
pub struct FrameDecoder<C, const N: usize = DEFAULT_MAX_PAYLOAD> {
    config: FrameConfig,
    consumer: C,
    state: DecodeState,
    /// Declared length (command + payload) of the in-flight frame
    length: u16,
    command: u8,
    payload: Vec<u8, N>,
    received_crc: u16,
    /// Checksum over length ‖ command ‖ payload, accumulated as bytes arrive
    span_crc: Crc16,
    stats: DecoderStats,
}

impl<C: PacketConsumer> FrameDecoder<C> {
    /// Create a decoder with the default configuration and capacity.
    pub fn with_default_config(consumer: C) -> Self {
        Self::from_parts(FrameConfig::default(), consumer)
    }
}

impl<C: PacketConsumer, const N: usize> FrameDecoder<C, N> {
    /// Create a decoder in the `WaitHeader1` state.
    ///
    /// # Errors
    ///
    /// Returns an error if `config.max_payload` exceeds the buffer capacity
    /// `N` or cannot be expressed in the 16-bit length field.
    pub fn new(config: FrameConfig, consumer: C) -> Result<Self, ConfigError> {
        config.check_payload_capacity(N)?;
        Ok(Self::from_parts(config, consumer))
    }

    fn from_parts(config: FrameConfig, consumer: C) -> Self {
        Self {
            config,
            consumer,
            state: DecodeState::WaitHeader1,
            length: 0,
            command: 0,
            payload: Vec::new(),
            received_crc: 0,
            span_crc: Crc16::new(),
            stats: DecoderStats::default(),
        }
    }

    /// Advance the state machine by one received byte.
    ///
    /// Never blocks, allocates or panics. On completion of a valid frame the
    /// consumer is invoked before this call returns.
    pub fn feed(&mut self, byte: u8) {
        self.stats.record_byte();

        match self.state {
            DecodeState::WaitHeader1 => {
                if byte == self.config.header_bytes()[0] {
                    self.state = DecodeState::WaitHeader2;
                }
            }

            DecodeState::WaitHeader2 => {
                if byte == self.config.header_bytes()[1] {
                    self.span_crc.reset();
                    self.state = DecodeState::WaitLengthHi;
                } else {
                    self.reject(RejectReason::Header);
                }
            }

            DecodeState::WaitLengthHi => {
                self.length = (byte as u16) << 8;
                self.span_crc.update_byte(byte);
                self.state = DecodeState::WaitLengthLo;
            }

            DecodeState::WaitLengthLo => {
                self.length |= byte as u16;
                self.span_crc.update_byte(byte);

                // Bound check before any payload byte is accepted
                let length = self.length as usize;
                if length == 0 || length > self.config.max_length_field() {
                    self.reject(RejectReason::Length);
                    return;
                }
                self.state = DecodeState::WaitCommand;
            }

            DecodeState::WaitCommand => {
                self.command = byte;
                self.span_crc.update_byte(byte);
                self.payload.clear();

                self.state = if self.length == 1 {
                    self.after_payload()
                } else {
                    DecodeState::ReadData
                };
            }

            DecodeState::ReadData => {
                if self.payload.push(byte).is_err() {
                    self.reject(RejectReason::Overflow);
                    return;
                }
                self.span_crc.update_byte(byte);

                if self.payload.len() >= self.length as usize - 1 {
                    self.state = self.after_payload();
                }
            }

            DecodeState::WaitCrc1 => {
                self.received_crc = (byte as u16) << 8;
                self.state = DecodeState::WaitCrc2;
            }

            DecodeState::WaitCrc2 => {
                self.received_crc |= byte as u16;

                let computed = self.span_crc.finish();
                if computed != self.received_crc {
                    tracing::trace!(
                        received = self.received_crc,
                        computed,
                        "checksum mismatch"
                    );
                    self.reject(RejectReason::Checksum);
                    return;
                }
                self.state = DecodeState::WaitEnd1;
            }

            DecodeState::WaitEnd1 => {
                if byte == self.config.trailer_bytes()[0] {
                    self.state = DecodeState::WaitEnd2;
                } else {
                    self.reject(RejectReason::Trailer);
                }
            }

            DecodeState::WaitEnd2 => {
                if byte == self.config.trailer_bytes()[1] {
                    self.dispatch();
                } else {
                    self.reject(RejectReason::Trailer);
                }
                self.clear_frame();
            }
        }
    }

    /// Feed a span of bytes in order. Equivalent to calling [`feed`](Self::feed)
    /// for each byte.
    pub fn feed_slice(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.feed(byte);
        }
    }

    /// Discard any partial frame and return to header search.
    ///
    /// Use this to implement an inactivity timeout: the decoder itself waits
    /// forever for the rest of a frame.
    pub fn reset(&mut self) {
        if self.state != DecodeState::WaitHeader1 {
            tracing::debug!(state = self.state.name(), "decoder reset mid-frame");
        }
        self.clear_frame();
    }

    /// Current state
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// True while searching for a header (no partial frame held).
    pub fn is_idle(&self) -> bool {
        self.state == DecodeState::WaitHeader1
    }

    /// Decoder statistics
    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    /// Zero all statistics counters. Decoder state is untouched.
    pub fn reset_stats(&mut self) {
        self.stats = DecoderStats::default();
    }

    /// Active configuration
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Payload buffer capacity `N`
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Shared access to the consumer
    pub fn consumer(&self) -> &C {
        &self.consumer
    }

    /// Exclusive access to the consumer
    pub fn consumer_mut(&mut self) -> &mut C {
        &mut self.consumer
    }

    /// Consume the decoder, returning the consumer
    pub fn into_consumer(self) -> C {
        self.consumer
    }

    fn after_payload(&self) -> DecodeState {
        if self.config.checksum_enabled {
            DecodeState::WaitCrc1
        } else {
            DecodeState::WaitEnd1
        }
    }

    fn dispatch(&mut self) {
        tracing::trace!(
            command = self.command,
            len = self.payload.len(),
            "frame delivered"
        );
        self.stats.record_delivery();
        self.consumer.on_packet(self.command, &self.payload);
    }

    fn reject(&mut self, reason: RejectReason) {
        tracing::debug!(
            reason = reason.as_str(),
            state = self.state.name(),
            "frame rejected, resynchronizing"
        );
        self.stats.record_reject(reason);
        self.clear_frame();
    }

    fn clear_frame(&mut self) {
        self.state = DecodeState::WaitHeader1;
        self.length = 0;
        self.command = 0;
        self.received_crc = 0;
        self.payload.clear();
    }
}

impl<C, const N: usize> core::fmt::Debug for FrameDecoder<C, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameDecoder")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("length", &self.length)
            .field("buffered", &self.payload.len())
            .field("capacity", &N)
            .field("stats", &self.stats)
            .finish()
    }
}
