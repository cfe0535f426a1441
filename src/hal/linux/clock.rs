//! System time sources.

use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::traits::{Clock, Delay, WallClock};

/// Monotonic time since construction, system calendar time, and
/// thread sleeps.
///
/// # Example
///
/// ```ignore
/// use metar_clock::hal::SystemClock;
/// use metar_clock::traits::{Clock, Delay};
///
/// let mut clock = SystemClock::new();
/// clock.delay_ms(10);
/// assert!(clock.now_ms() >= 10);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    /// Creates a clock starting at zero.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl WallClock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl Delay for SystemClock {
    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_moves_monotonic_time() {
        let mut clock = SystemClock::new();
        clock.delay_ms(5);
        assert!(clock.now_ms() >= 5);
    }
}
