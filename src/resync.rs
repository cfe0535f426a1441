//! Link recovery after a decode failure or a device error signal.
//!
//! Recovery is best-effort and never fails: each step that errors is
//! logged and the sequence continues. Running it twice in a row leaves
//! the link in the same state as running it once.

use tracing::{debug, warn};

use crate::traits::{Delay, SerialLink};

/// Terminator bytes written to make the display abandon a partial command.
pub const FLUSH: [u8; 5] = [0xFF; 5];

/// Default wait between the flush and the final inbound clear.
pub const DEFAULT_SETTLE_MS: u32 = 50;

/// Restores frame alignment on a [`SerialLink`].
///
/// # Example
///
/// ```rust
/// use metar_clock::hal::{MockClock, MockLink};
/// use metar_clock::ResyncController;
///
/// let mut link = MockLink::new();
/// link.push_inbound(b"\x1a\xff\xff\xffgarbage");
/// let mut clock = MockClock::new();
///
/// let clean = ResyncController::new().recover(&mut link, &mut clock);
/// assert!(clean);
/// assert!(link.inbound.is_empty());
/// assert_eq!(link.flushes, 1);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ResyncController {
    settle_ms: u32,
}

impl Default for ResyncController {
    fn default() -> Self {
        Self::new()
    }
}

impl ResyncController {
    /// Creates a controller with the default 50 ms settle time.
    pub const fn new() -> Self {
        Self {
            settle_ms: DEFAULT_SETTLE_MS,
        }
    }

    /// Override the settle time.
    pub const fn with_settle_ms(mut self, ms: u32) -> Self {
        self.settle_ms = ms;
        self
    }

    /// Settle time in milliseconds.
    pub const fn settle_ms(&self) -> u32 {
        self.settle_ms
    }

    /// Run the recovery sequence.
    ///
    /// 1. clear inbound and outbound buffers
    /// 2. write [`FLUSH`]
    /// 3. wait the settle time
    /// 4. clear inbound again, dropping the display's reply to the flush
    ///
    /// Returns true if every step succeeded.
    pub fn recover<L, D>(&self, link: &mut L, delay: &mut D) -> bool
    where
        L: SerialLink + ?Sized,
        D: Delay + ?Sized,
    {
        let mut clean = true;

        if let Err(e) = link.clear_input() {
            warn!(error = %e, "resync: clearing inbound buffer failed");
            clean = false;
        }
        if let Err(e) = link.clear_output() {
            warn!(error = %e, "resync: clearing outbound buffer failed");
            clean = false;
        }
        if let Err(e) = link.write_all(&FLUSH) {
            warn!(error = %e, "resync: writing flush failed");
            clean = false;
        }
        delay.delay_ms(self.settle_ms);
        if let Err(e) = link.clear_input() {
            warn!(error = %e, "resync: final inbound clear failed");
            clean = false;
        }

        debug!(clean, "link resynchronized");
        clean
    }
}
