// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::error::RejectReason;

/// Running counters kept by a [`FrameDecoder`](crate::FrameDecoder).
///
/// Counters saturate instead of wrapping. Rejections are recorded here and
/// in a `debug` log event, never reported to the packet consumer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecoderStats {
    /// Bytes passed to `feed`
    pub bytes_fed: u64,
    /// Frames handed to the consumer
    pub frames_delivered: u64,
    /// Header second-byte mismatches
    pub header_rejects: u64,
    /// Length field out of bounds
    pub length_rejects: u64,
    /// CRC mismatches
    pub checksum_rejects: u64,
    /// Trailer mismatches
    pub trailer_rejects: u64,
    /// Payload buffer overflow guards
    pub overflow_rejects: u64,
}

impl DecoderStats {
    /// Sum of all rejection counters.
    pub fn total_rejects(&self) -> u64 {
        self.header_rejects
            .saturating_add(self.length_rejects)
            .saturating_add(self.checksum_rejects)
            .saturating_add(self.trailer_rejects)
            .saturating_add(self.overflow_rejects)
    }

    /// Counter value for one rejection reason.
    pub fn rejects(&self, reason: RejectReason) -> u64 {
        match reason {
            RejectReason::Header => self.header_rejects,
            RejectReason::Length => self.length_rejects,
            RejectReason::Checksum => self.checksum_rejects,
            RejectReason::Trailer => self.trailer_rejects,
            RejectReason::Overflow => self.overflow_rejects,
        }
    }

    pub(crate) fn record_reject(&mut self, reason: RejectReason) {
        let counter = match reason {
            RejectReason::Header => &mut self.header_rejects,
            RejectReason::Length => &mut self.length_rejects,
            RejectReason::Checksum => &mut self.checksum_rejects,
            RejectReason::Trailer => &mut self.trailer_rejects,
            RejectReason::Overflow => &mut self.overflow_rejects,
        };
        *counter = counter.saturating_add(1);
    }

    pub(crate) fn record_byte(&mut self) {
        self.bytes_fed = self.bytes_fed.saturating_add(1);
    }

    pub(crate) fn record_delivery(&mut self) {
        self.frames_delivered = self.frames_delivered.saturating_add(1);
    }
}
