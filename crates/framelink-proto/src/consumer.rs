// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Packet consumer abstraction.
//!
//! The decoder hands each fully validated frame to a [`PacketConsumer`]
//! synchronously from inside `feed`. Closures of the form
//! `FnMut(u8, &[u8])` are consumers, so per-stream state can be captured
//! directly:
//!
//! ```
//! use framelink_proto::{FrameConfig, FrameDecoder};
//!
//! let mut count = 0;
//! let mut decoder: FrameDecoder<_> =
//!     FrameDecoder::new(FrameConfig::default(), |_cmd: u8, _payload: &[u8]| count += 1).unwrap();
//! decoder.feed_slice(&[0xAA, 0x55, 0x00, 0x01, 0x01, 0xEF, 0x8C, 0x55, 0xAA]);
//! drop(decoder);
//! assert_eq!(count, 1);
//! ```

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "std")]
use std::vec::Vec;

/// Receiver of decoded packets.
pub trait PacketConsumer {
    /// Called once per validated frame with the command byte and the payload
    /// bytes actually received (never checksum or trailer bytes).
    fn on_packet(&mut self, command: u8, payload: &[u8]);
}

impl<F> PacketConsumer for F
where
    F: FnMut(u8, &[u8]),
{
    fn on_packet(&mut self, command: u8, payload: &[u8]) {
        self(command, payload)
    }
}

/// Owned copy of one decoded packet.
#[cfg(feature = "std")]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Packet {
    /// Command byte
    pub command: u8,
    /// Payload bytes
    pub payload: Vec<u8>,
}

#[cfg(feature = "std")]
impl Packet {
    /// Create a packet from a command byte and payload.
    pub fn new(command: u8, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            command,
            payload: payload.into(),
        }
    }
}

/// Consumer that stores every packet it receives.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Default)]
pub struct PacketCollector {
    packets: Vec<Packet>,
}

#[cfg(feature = "std")]
impl PacketCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Packets received so far, in arrival order
    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    /// Remove and return all stored packets
    pub fn take(&mut self) -> Vec<Packet> {
        core::mem::take(&mut self.packets)
    }

    /// Number of stored packets
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    /// True if no packets are stored
    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }
}

#[cfg(feature = "std")]
impl PacketConsumer for PacketCollector {
    fn on_packet(&mut self, command: u8, payload: &[u8]) {
        self.packets.push(Packet::new(command, payload));
    }
}
