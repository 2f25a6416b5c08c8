// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/// Serial I/O abstraction for byte-stream transports
///
/// Implemented once per platform (UART peripheral, USB CDC endpoint, BLE
/// UART characteristic, host serial port). Bytes must be returned by `read`
/// in arrival order.
pub trait SerialIO {
    /// Platform-specific error type
    type Error;

    /// Write bytes to the transport
    ///
    /// May accept fewer bytes than offered; returns how many were taken.
    /// Returning 0 for a non-empty `data` means the transport cannot make
    /// progress.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Read bytes from the transport (non-blocking)
    ///
    /// Returns 0 when no data is pending.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error>;

    /// Flush output buffer
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Check if data is available to read
    fn available(&self) -> Result<bool, Self::Error> {
        // Platforms without a cheap RX-ready check just poll `read`
        Ok(false)
    }
}

impl<S: SerialIO + ?Sized> SerialIO for &mut S {
    type Error = S::Error;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        (**self).write(data)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).read(buffer)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        (**self).flush()
    }

    fn available(&self) -> Result<bool, Self::Error> {
        (**self).available()
    }
}
