// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-memory transport.
//!
//! Endpoints share byte queues behind `parking_lot` mutexes, so a pair can be
//! driven from two threads.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::serial::SerialIO;

/// Loopback transport errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoopbackError {
    /// `disconnect` was called on either end of the pair
    #[error("Loopback endpoint disconnected")]
    Disconnected,
}

type Queue = Arc<Mutex<VecDeque<u8>>>;

/// In-memory [`SerialIO`] endpoint.
///
/// A single endpoint from [`new`](Self::new) echoes its own writes back to
/// its reader. Endpoints from [`pair`](Self::pair) are cross-connected.
#[derive(Debug, Clone)]
pub struct LoopbackSerial {
    rx: Queue,
    tx: Queue,
    connected: Arc<AtomicBool>,
    max_write: Option<usize>,
}

impl LoopbackSerial {
    /// Create an echo endpoint
    pub fn new() -> Self {
        let queue = Queue::default();
        Self {
            rx: Arc::clone(&queue),
            tx: queue,
            connected: Arc::new(AtomicBool::new(true)),
            max_write: None,
        }
    }

    /// Create two cross-connected endpoints
    pub fn pair() -> (Self, Self) {
        let a_to_b = Queue::default();
        let b_to_a = Queue::default();
        let connected = Arc::new(AtomicBool::new(true));

        let a = Self {
            rx: Arc::clone(&b_to_a),
            tx: Arc::clone(&a_to_b),
            connected: Arc::clone(&connected),
            max_write: None,
        };
        let b = Self {
            rx: a_to_b,
            tx: b_to_a,
            connected,
            max_write: None,
        };
        (a, b)
    }

    /// Limit how many bytes a single `write` accepts. 0 makes every write
    /// stall.
    pub fn with_max_write(mut self, max_write: usize) -> Self {
        self.max_write = Some(max_write);
        self
    }

    /// Push raw bytes into this endpoint's receive queue, as if they had
    /// arrived from the wire.
    pub fn inject(&self, bytes: &[u8]) {
        self.rx.lock().extend(bytes);
    }

    /// Bytes waiting to be read by this endpoint
    pub fn pending(&self) -> usize {
        self.rx.lock().len()
    }

    /// Take everything waiting in this endpoint's receive queue
    pub fn drain(&self) -> Vec<u8> {
        self.rx.lock().drain(..).collect()
    }

    /// Disconnect both ends. Later reads and writes fail.
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::Release);
    }

    /// True until [`disconnect`](Self::disconnect) is called on either end
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn ensure_connected(&self) -> Result<(), LoopbackError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(LoopbackError::Disconnected)
        }
    }
}

impl Default for LoopbackSerial {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialIO for LoopbackSerial {
    type Error = LoopbackError;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        self.ensure_connected()?;
        let n = self.max_write.map_or(data.len(), |max| max.min(data.len()));
        self.tx.lock().extend(&data[..n]);
        Ok(n)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        self.ensure_connected()?;
        let mut rx = self.rx.lock();
        let n = buffer.len().min(rx.len());
        for (slot, byte) in buffer.iter_mut().zip(rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.ensure_connected()
    }

    fn available(&self) -> Result<bool, Self::Error> {
        self.ensure_connected()?;
        Ok(!self.rx.lock().is_empty())
    }
}
