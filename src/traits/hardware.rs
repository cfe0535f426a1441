//! Hardware abstraction traits for the display serial link and time sources.
//!
//! This module defines the interfaces that let the clock engine run against
//! a real serial port on Linux or against in-memory doubles in tests.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`SerialLink`] | Byte stream to the touchscreen controller |
//! | [`Clock`] | Monotonic time for cadence decisions |
//! | [`WallClock`] | Calendar time for the clock face and report ageing |
//! | [`Delay`] | Blocking sleep between scheduler ticks |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. For a Linux host, use the implementations
//! from `hal::linux` (requires the `linux` feature).
//!
//! # Example
//!
//! ```rust
//! use metar_clock::traits::SerialLink;
//! use metar_clock::hal::MockLink;
//!
//! let mut link = MockLink::new();
//! link.push_inbound(b"STAKJFK\xff\xff\xff");
//! assert_eq!(link.bytes_available().unwrap(), 10);
//!
//! link.write_all(b"page data\xff\xff\xff").unwrap();
//! assert_eq!(link.frames_written(), vec!["page data".to_string()]);
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failure talking to the serial device.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying port returned an I/O error.
    #[error("serial I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The port refused an operation (bad configuration, device gone).
    #[error("serial port error: {0}")]
    Port(String),
}

/// Half-duplex byte link to the display controller.
///
/// The link is used poll-then-act: callers check [`bytes_available`]
/// before reading so the scheduler never stalls on an idle device.
///
/// # Implementation Notes
///
/// - `read` blocks for at most the port's read timeout and returns `Ok(0)`
///   when that timeout expires with nothing received
/// - `write_all` must hand every byte to the port before returning
/// - clearing a buffer discards data without transmitting it
///
/// [`bytes_available`]: SerialLink::bytes_available
pub trait SerialLink {
    /// Number of inbound bytes already buffered.
    fn bytes_available(&mut self) -> Result<usize, TransportError>;

    /// Read up to `buf.len()` bytes, returning how many were read.
    ///
    /// Returns `Ok(0)` on read timeout.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Write every byte of `bytes`.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Discard buffered inbound bytes.
    fn clear_input(&mut self) -> Result<(), TransportError>;

    /// Discard buffered outbound bytes.
    fn clear_output(&mut self) -> Result<(), TransportError>;

    /// Read every byte that is already buffered, without waiting.
    fn drain_available(&mut self) -> Result<Vec<u8>, TransportError> {
        let mut drained = Vec::new();
        let mut chunk = [0u8; 64];
        loop {
            let pending = self.bytes_available()?;
            if pending == 0 {
                break;
            }
            let want = pending.min(chunk.len());
            let got = self.read(&mut chunk[..want])?;
            if got == 0 {
                break;
            }
            drained.extend_from_slice(&chunk[..got]);
        }
        Ok(drained)
    }
}

/// Monotonic time source.
///
/// Provides milliseconds since an arbitrary epoch for cadence timing.
///
/// # Example
///
/// ```rust
/// use metar_clock::traits::Clock;
/// use metar_clock::hal::MockClock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(100);
/// assert_eq!(clock.now_ms(), 100);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}

/// Calendar time source.
pub trait WallClock {
    /// Current instant in UTC.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Blocking delay used between scheduler iterations.
pub trait Delay {
    /// Delay for the specified number of milliseconds.
    fn delay_ms(&mut self, ms: u32);
}
