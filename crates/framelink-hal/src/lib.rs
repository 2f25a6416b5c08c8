// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

//! # framelink-hal
//!
//! Transport seam for the framelink protocol.
//!
//! This crate provides:
//! - **HAL traits** - [`SerialIO`] for byte transports (UART, USB CDC, BLE
//!   UART service), [`TimeProvider`] for a monotonic microsecond clock
//! - **Link driver** - [`FrameLink`] pairs one transport with one encoder and
//!   one decoder
//! - **Loopback transport** (`std`) - in-memory [`LoopbackSerial`] for tests
//!   and host-side tooling
//!
//! ## Usage
//!
//! ```
//! use framelink_hal::{FrameLink, LoopbackSerial};
//! use framelink_proto::{FrameConfig, PacketCollector};
//!
//! let (host, device) = LoopbackSerial::pair();
//! let mut tx: FrameLink<_, _> =
//!     FrameLink::new(host, FrameConfig::default(), |_: u8, _: &[u8]| {}).unwrap();
//! let mut rx: FrameLink<_, _> =
//!     FrameLink::new(device, FrameConfig::default(), PacketCollector::new()).unwrap();
//!
//! tx.send(0x10, &[0x02, 0x03]).unwrap();
//! while rx.poll().unwrap() > 0 {}
//!
//! assert_eq!(rx.decoder().consumer().len(), 1);
//! ```

/// Byte transport trait.
pub mod serial;

/// Clock trait and implementations.
pub mod time;

/// Link driver tying a transport to an encoder and decoder.
pub mod link;

/// In-memory loopback transport.
#[cfg(feature = "std")]
pub mod loopback;

pub use link::{FrameLink, LinkError, DEFAULT_READ_CHUNK, MAX_READ_CHUNK};
pub use serial::SerialIO;
pub use time::{NoClock, TimeProvider};

#[cfg(feature = "std")]
pub use loopback::{LoopbackError, LoopbackSerial};
#[cfg(feature = "std")]
pub use time::StdClock;

/// Common imports for link users
pub mod prelude {
    pub use crate::link::{FrameLink, LinkError};
    pub use crate::serial::SerialIO;
    pub use crate::time::TimeProvider;
    pub use framelink_proto::{FrameConfig, PacketConsumer};
}
