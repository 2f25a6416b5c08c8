// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/// Monotonic clock used for the receive timeout
pub trait TimeProvider {
    /// Get current time in microseconds since an arbitrary fixed origin
    ///
    /// # Returns
    /// Monotonic timestamp in microseconds
    fn get_time_us(&self) -> u64;
}

impl<T: TimeProvider + ?Sized> TimeProvider for &T {
    fn get_time_us(&self) -> u64 {
        (**self).get_time_us()
    }
}

/// Clock for links without a receive timeout. Always reads zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoClock;

impl TimeProvider for NoClock {
    fn get_time_us(&self) -> u64 {
        0
    }
}

/// Wall clock backed by [`std::time::Instant`], measured from construction.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Start a clock at zero
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeProvider for StdClock {
    fn get_time_us(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    fn now<T: TimeProvider>(clock: T) -> u64 {
        clock.get_time_us()
    }

    #[test]
    fn test_no_clock_is_constant() {
        let clock = NoClock;
        assert_eq!(clock.get_time_us(), 0);
        assert_eq!(now(&clock), 0);
    }

    #[test]
    fn test_std_clock_is_monotonic() {
        let clock = StdClock::new();
        let t0 = clock.get_time_us();
        std::thread::sleep(std::time::Duration::from_micros(200));
        let t1 = clock.get_time_us();
        assert!(t1 >= t0 + 200);
    }
}
