// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Link driver.
//!
//! A [`FrameLink`] owns one transport, one encoder and one decoder. Sending
//! and receiving are independent: `send` encodes and writes one frame,
//! `poll` reads whatever the transport has buffered and feeds it to the
//! decoder, which invokes the consumer for each completed frame.

use core::fmt;

use framelink_proto::{
    ConfigError, EncodeError, FrameConfig, FrameDecoder, FrameEncoder, PacketConsumer,
    DEFAULT_MAX_FRAME_LEN, DEFAULT_MAX_PAYLOAD,
};

use crate::serial::SerialIO;
use crate::time::{NoClock, TimeProvider};

#[cfg(feature = "std")]
extern crate std;

/// Largest number of bytes `poll` requests from the transport at once.
pub const MAX_READ_CHUNK: usize = 256;

/// Default number of bytes `poll` requests from the transport.
pub const DEFAULT_READ_CHUNK: usize = 64;

/// Link failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError<E> {
    /// Frame could not be encoded; nothing was written
    Encode(EncodeError),
    /// Transport reported an error
    Transport(E),
    /// Transport accepted zero bytes before the frame was complete
    WriteStalled {
        /// Bytes accepted before the stall
        written: usize,
        /// Encoded frame length
        total: usize,
    },
}

impl<E> From<EncodeError> for LinkError<E> {
    fn from(err: EncodeError) -> Self {
        LinkError::Encode(err)
    }
}

impl<E: fmt::Display> fmt::Display for LinkError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::Encode(err) => write!(f, "Encode failed: {}", err),
            LinkError::Transport(err) => write!(f, "Transport error: {}", err),
            LinkError::WriteStalled { written, total } => write!(
                f,
                "Transport stalled after {} of {} bytes",
                written, total
            ),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug + fmt::Display> std::error::Error for LinkError<E> {}

/// One transport endpoint with its encoder and decoder.
///
/// `T` is the clock used for the optional receive timeout, `N` the decoder
/// payload capacity and `F` the encoder frame capacity.
pub struct FrameLink<
    S,
    C,
    T = NoClock,
    const N: usize = DEFAULT_MAX_PAYLOAD,
    const F: usize = DEFAULT_MAX_FRAME_LEN,
> {
    serial: S,
    encoder: FrameEncoder<F>,
    decoder: FrameDecoder<C, N>,
    clock: T,
    /// 0 disables the timeout
    rx_timeout_us: u64,
    last_rx_us: u64,
    read_chunk: usize,
}

impl<S, C, const N: usize, const F: usize> FrameLink<S, C, NoClock, N, F>
where
    S: SerialIO,
    C: PacketConsumer,
{
    /// Create a link without a receive timeout.
    ///
    /// # Errors
    ///
    /// Fails if `config` does not fit the decoder capacity `N` or the encoder
    /// capacity `F`.
    pub fn new(serial: S, config: FrameConfig, consumer: C) -> Result<Self, ConfigError> {
        Ok(Self {
            serial,
            encoder: FrameEncoder::new(config)?,
            decoder: FrameDecoder::new(config, consumer)?,
            clock: NoClock,
            rx_timeout_us: 0,
            last_rx_us: 0,
            read_chunk: DEFAULT_READ_CHUNK,
        })
    }

    /// Enable the receive timeout.
    ///
    /// A partial frame older than `timeout_us` (measured from the last byte
    /// received) is discarded on the next `poll`. A timeout of 0 leaves the
    /// timeout disabled.
    pub fn with_rx_timeout<T: TimeProvider>(self, clock: T, timeout_us: u64) -> FrameLink<S, C, T, N, F> {
        let last_rx_us = clock.get_time_us();
        FrameLink {
            serial: self.serial,
            encoder: self.encoder,
            decoder: self.decoder,
            clock,
            rx_timeout_us: timeout_us,
            last_rx_us,
            read_chunk: self.read_chunk,
        }
    }
}

impl<S, C, T, const N: usize, const F: usize> FrameLink<S, C, T, N, F>
where
    S: SerialIO,
    C: PacketConsumer,
    T: TimeProvider,
{
    /// Set how many bytes `poll` requests per call, clamped to
    /// `1..=MAX_READ_CHUNK`.
    pub fn with_read_chunk(mut self, size: usize) -> Self {
        self.read_chunk = size.clamp(1, MAX_READ_CHUNK);
        self
    }

    /// Encode a frame and write all of it to the transport, then flush.
    ///
    /// Returns the number of bytes written.
    pub fn send(&mut self, command: u8, payload: &[u8]) -> Result<usize, LinkError<S::Error>> {
        let frame = self.encoder.encode(command, payload)?;
        let total = frame.len();

        let mut written = 0;
        while written < total {
            let n = self
                .serial
                .write(&frame[written..])
                .map_err(LinkError::Transport)?;
            if n == 0 {
                tracing::debug!(written, total, "transport stalled mid-frame");
                return Err(LinkError::WriteStalled { written, total });
            }
            written += n.min(total - written);
        }

        self.serial.flush().map_err(LinkError::Transport)?;
        tracing::trace!(command, len = total, "frame sent");
        Ok(total)
    }

    /// Read one chunk from the transport and feed it to the decoder.
    ///
    /// Returns the number of bytes fed (0 when nothing was pending). Consumer
    /// callbacks for any frames completed by these bytes run before this
    /// returns.
    pub fn poll(&mut self) -> Result<usize, LinkError<S::Error>> {
        let mut chunk = [0u8; MAX_READ_CHUNK];
        let requested = self.read_chunk;
        let n = self
            .serial
            .read(&mut chunk[..requested])
            .map_err(LinkError::Transport)?
            .min(requested);

        if self.rx_timeout_us > 0 {
            let now = self.clock.get_time_us();
            self.expire_partial_frame(now);
            if n > 0 {
                self.last_rx_us = now;
            }
        }

        self.decoder.feed_slice(&chunk[..n]);
        Ok(n)
    }

    /// Poll until the transport reports no pending bytes.
    ///
    /// Returns the total number of bytes fed.
    pub fn poll_until_empty(&mut self) -> Result<usize, LinkError<S::Error>> {
        let mut total = 0;
        loop {
            let n = self.poll()?;
            if n == 0 {
                return Ok(total);
            }
            total += n;
        }
    }

    fn expire_partial_frame(&mut self, now: u64) {
        if self.decoder.is_idle() {
            return;
        }
        let silent_for = now.saturating_sub(self.last_rx_us);
        if silent_for > self.rx_timeout_us {
            tracing::debug!(
                silent_for_us = silent_for,
                timeout_us = self.rx_timeout_us,
                "receive timeout, discarding partial frame"
            );
            self.decoder.reset();
        }
    }

    /// Decoder state and statistics
    pub fn decoder(&self) -> &FrameDecoder<C, N> {
        &self.decoder
    }

    /// Mutable decoder access (reset, consumer access)
    pub fn decoder_mut(&mut self) -> &mut FrameDecoder<C, N> {
        &mut self.decoder
    }

    /// Active protocol configuration
    pub fn config(&self) -> &FrameConfig {
        self.encoder.config()
    }

    /// Receive timeout in microseconds (0 when disabled)
    pub fn rx_timeout_us(&self) -> u64 {
        self.rx_timeout_us
    }

    /// Bytes requested from the transport per `poll`
    pub fn read_chunk(&self) -> usize {
        self.read_chunk
    }

    /// Shared transport access
    pub fn serial(&self) -> &S {
        &self.serial
    }

    /// Mutable transport access
    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    /// Tear down the link, returning the transport and the consumer
    pub fn into_parts(self) -> (S, C) {
        (self.serial, self.decoder.into_consumer())
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use core::cell::Cell;
    use framelink_proto::{Packet, PacketCollector};
    use std::collections::VecDeque;
    use std::vec::Vec;

    /// Scripted transport: reads come from `rx`, writes land in `tx`.
    #[derive(Default)]
    struct ScriptedSerial {
        rx: VecDeque<u8>,
        tx: Vec<u8>,
        write_limit: Option<usize>,
        flushes: usize,
        fail_reads: bool,
    }

    impl SerialIO for ScriptedSerial {
        type Error = &'static str;

        fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
            let n = self.write_limit.map_or(data.len(), |limit| limit.min(data.len()));
            self.tx.extend_from_slice(&data[..n]);
            Ok(n)
        }

        fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
            if self.fail_reads {
                return Err("rx fault");
            }
            let n = buffer.len().min(self.rx.len());
            for slot in buffer.iter_mut().take(n) {
                *slot = self.rx.pop_front().unwrap_or(0);
            }
            Ok(n)
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            self.flushes += 1;
            Ok(())
        }
    }

    struct ManualClock {
        now: Cell<u64>,
    }

    impl ManualClock {
        fn advance(&self, us: u64) {
            self.now.set(self.now.get() + us);
        }
    }

    impl TimeProvider for ManualClock {
        fn get_time_us(&self) -> u64 {
            self.now.get()
        }
    }

    fn link(serial: ScriptedSerial) -> FrameLink<ScriptedSerial, PacketCollector> {
        FrameLink::new(serial, FrameConfig::default(), PacketCollector::new()).unwrap()
    }

    #[test]
    fn test_send_writes_full_frame_and_flushes() {
        let mut link = link(ScriptedSerial::default());
        let n = link.send(0x10, &[0x02, 0x03]).unwrap();
        assert_eq!(n, 11);
        assert_eq!(
            link.serial().tx,
            vec![0xAA, 0x55, 0x00, 0x03, 0x10, 0x02, 0x03, 0x9F, 0xB2, 0x55, 0xAA]
        );
        assert_eq!(link.serial().flushes, 1);
    }

    #[test]
    fn test_send_handles_partial_writes() {
        let serial = ScriptedSerial {
            write_limit: Some(3),
            ..Default::default()
        };
        let mut link = link(serial);
        assert_eq!(link.send(0x01, &[1, 2, 3, 4]).unwrap(), 13);
        assert_eq!(link.serial().tx.len(), 13);
    }

    #[test]
    fn test_send_reports_stall() {
        let serial = ScriptedSerial {
            write_limit: Some(0),
            ..Default::default()
        };
        let mut link = link(serial);
        assert_eq!(
            link.send(0x01, &[]),
            Err(LinkError::WriteStalled {
                written: 0,
                total: 9
            })
        );
        assert_eq!(link.serial().flushes, 0);
    }

    #[test]
    fn test_send_rejects_oversize_payload() {
        let mut link = link(ScriptedSerial::default());
        let payload = [0u8; 300];
        assert!(matches!(
            link.send(0x01, &payload),
            Err(LinkError::Encode(EncodeError::PayloadTooLong { len: 300, .. }))
        ));
        assert!(link.serial().tx.is_empty());
    }

    #[test]
    fn test_poll_feeds_decoder_in_chunks() {
        let mut serial = ScriptedSerial::default();
        serial
            .rx
            .extend([0xAA, 0x55, 0x00, 0x03, 0x10, 0x02, 0x03, 0x9F, 0xB2, 0x55, 0xAA]);
        let mut link = link(serial).with_read_chunk(4);

        assert_eq!(link.poll().unwrap(), 4);
        assert!(link.decoder().consumer().is_empty());
        assert_eq!(link.poll_until_empty().unwrap(), 7);
        assert_eq!(
            link.decoder().consumer().packets(),
            &[Packet::new(0x10, vec![0x02, 0x03])]
        );
        assert_eq!(link.poll().unwrap(), 0);
    }

    #[test]
    fn test_poll_propagates_transport_error() {
        let serial = ScriptedSerial {
            fail_reads: true,
            ..Default::default()
        };
        let mut link = link(serial);
        assert_eq!(link.poll(), Err(LinkError::Transport("rx fault")));
    }

    #[test]
    fn test_read_chunk_is_clamped() {
        let default = link(ScriptedSerial::default());
        assert_eq!(default.read_chunk(), DEFAULT_READ_CHUNK);
        assert_eq!(default.with_read_chunk(0).read_chunk(), 1);

        let large = link(ScriptedSerial::default()).with_read_chunk(10_000);
        assert_eq!(large.read_chunk(), MAX_READ_CHUNK);
    }

    #[test]
    fn test_rx_timeout_discards_stale_partial_frame() {
        let clock = ManualClock { now: Cell::new(0) };
        let frame = [0xAA, 0x55, 0x00, 0x03, 0x10, 0x02, 0x03, 0x9F, 0xB2, 0x55, 0xAA];

        let mut serial = ScriptedSerial::default();
        serial.rx.extend(&frame[..6]);
        let mut link = link(serial).with_rx_timeout(&clock, 1_000);

        link.poll().unwrap();
        assert!(!link.decoder().is_idle());

        // Silence longer than the timeout, then the rest of the frame
        clock.advance(1_500);
        link.serial_mut().rx.extend(&frame[6..]);
        link.poll().unwrap();
        assert!(link.decoder().consumer().is_empty());

        // A fresh frame after the reset decodes normally
        link.serial_mut().rx.push_back(0x00);
        link.serial_mut().rx.extend(&frame);
        link.poll_until_empty().unwrap();
        assert_eq!(link.decoder().consumer().len(), 1);
    }

    #[test]
    fn test_rx_timeout_keeps_frame_within_window() {
        let clock = ManualClock { now: Cell::new(0) };
        let frame = [0xAA, 0x55, 0x00, 0x01, 0x01, 0xEF, 0x8C, 0x55, 0xAA];

        let mut serial = ScriptedSerial::default();
        serial.rx.extend(&frame[..4]);
        let mut link = link(serial).with_rx_timeout(&clock, 1_000);
        assert_eq!(link.rx_timeout_us(), 1_000);

        link.poll().unwrap();
        clock.advance(900);
        link.serial_mut().rx.extend(&frame[4..]);
        link.poll().unwrap();

        assert_eq!(link.decoder().consumer().packets(), &[Packet::new(0x01, vec![])]);
    }

    #[test]
    fn test_into_parts() {
        let mut serial = ScriptedSerial::default();
        serial.rx.extend([0xAA, 0x55, 0x00, 0x01, 0x01, 0xEF, 0x8C, 0x55, 0xAA]);
        let mut link = link(serial);
        link.poll().unwrap();

        let (serial, mut collector) = link.into_parts();
        assert!(serial.rx.is_empty());
        assert_eq!(collector.take().len(), 1);
    }
}
