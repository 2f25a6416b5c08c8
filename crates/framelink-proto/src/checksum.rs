// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! CRC-16/CCITT (a.k.a. CCITT-FALSE) checksum.
//!
//! Polynomial `0x1021`, initial value `0xFFFF`, MSB-first, no reflection and
//! no final XOR. Encoder and decoder must agree on every one of these
//! parameters; changing any of them breaks wire compatibility.

/// Initial accumulator value.
pub const CRC16_INIT: u16 = 0xFFFF;

/// Generator polynomial.
pub const CRC16_POLY: u16 = 0x1021;

/// Incremental CRC-16/CCITT accumulator.
///
/// Feeding a byte span in any number of pieces yields the same value as
/// [`crc16_ccitt`] over the whole span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc16 {
    value: u16,
}

impl Crc16 {
    /// Create an accumulator in its initial state.
    pub const fn new() -> Self {
        Self { value: CRC16_INIT }
    }

    /// Fold a single byte into the accumulator.
    #[inline]
    pub fn update_byte(&mut self, byte: u8) {
        self.value ^= (byte as u16) << 8;
        for _ in 0..8 {
            if self.value & 0x8000 != 0 {
                self.value = (self.value << 1) ^ CRC16_POLY;
            } else {
                self.value <<= 1;
            }
        }
    }

    /// Fold a byte span into the accumulator.
    pub fn update(&mut self, bytes: &[u8]) -> &mut Self {
        for &byte in bytes {
            self.update_byte(byte);
        }
        self
    }

    /// Current checksum value.
    #[inline]
    pub fn finish(&self) -> u16 {
        self.value
    }

    /// Return to the initial state.
    #[inline]
    pub fn reset(&mut self) {
        self.value = CRC16_INIT;
    }
}

impl Default for Crc16 {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the CRC-16/CCITT of `bytes`.
///
/// An empty span returns [`CRC16_INIT`] unchanged.
///
/// # Example
///
/// ```
/// use framelink_proto::crc16_ccitt;
///
/// assert_eq!(crc16_ccitt(b""), 0xFFFF);
/// assert_eq!(crc16_ccitt(b"123456789"), 0x29B1);
/// ```
pub fn crc16_ccitt(bytes: &[u8]) -> u16 {
    let mut crc = Crc16::new();
    crc.update(bytes);
    crc.finish()
}
