//! The display endpoint: owns the serial link, writes instructions, and
//! polls for operator input.

use tracing::warn;

use crate::frame::{self, DecodeError, Decoded};
use crate::resync::ResyncController;
use crate::traits::{Delay, SerialLink, TransportError};

/// Display writer and inbound poller.
///
/// # Example
///
/// ```rust
/// use metar_clock::hal::MockLink;
/// use metar_clock::Panel;
///
/// let mut link = MockLink::new();
/// link.push_frame("SPU");
///
/// let mut panel = Panel::new(link);
/// let frame = panel.poll().unwrap().unwrap();
/// assert_eq!(frame.text, "SPU");
///
/// panel.send("data.kt.aph=127");
/// assert_eq!(panel.link().frames_written(), vec!["data.kt.aph=127".to_string()]);
/// ```
#[derive(Debug)]
pub struct Panel<L> {
    link: L,
    resync: ResyncController,
    write_failures: u64,
}

impl<L: SerialLink> Panel<L> {
    /// Wrap a link with the default resync settings.
    pub fn new(link: L) -> Self {
        Self {
            link,
            resync: ResyncController::new(),
            write_failures: 0,
        }
    }

    /// Use a custom resync controller.
    pub fn with_resync(mut self, resync: ResyncController) -> Self {
        self.resync = resync;
        self
    }

    /// Write one instruction frame.
    pub fn try_send(&mut self, instruction: &str) -> Result<(), TransportError> {
        self.link.write_all(&frame::encode(instruction))
    }

    /// Write one instruction frame, logging a failure instead of returning it.
    pub fn send(&mut self, instruction: &str) {
        if let Err(e) = self.try_send(instruction) {
            self.write_failures += 1;
            warn!(error = %e, instruction, "display write failed");
        }
    }

    /// Write each instruction in order.
    pub fn send_all<I, S>(&mut self, instructions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for instruction in instructions {
            self.send(instruction.as_ref());
        }
    }

    /// Decode one inbound frame if any bytes are waiting.
    pub fn poll(&mut self) -> Result<Option<Decoded>, DecodeError> {
        frame::decode(&mut self.link)
    }

    /// Resynchronize the link.
    pub fn recover<D: Delay + ?Sized>(&mut self, delay: &mut D) -> bool {
        self.resync.recover(&mut self.link, delay)
    }

    /// Number of instruction writes that failed since creation.
    pub fn write_failures(&self) -> u64 {
        self.write_failures
    }

    /// Borrow the underlying link.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Mutably borrow the underlying link.
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Release the underlying link.
    pub fn into_inner(self) -> L {
        self.link
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{MockClock, MockLink};

    #[test]
    fn send_all_writes_in_order() {
        let mut panel = Panel::new(MockLink::new());
        panel.send_all(["page splash", "dim=100"]);
        assert_eq!(
            panel.link().frames_written(),
            vec!["page splash".to_string(), "dim=100".to_string()]
        );
    }

    #[test]
    fn send_counts_failures_without_panicking() {
        let mut link = MockLink::new();
        link.fail = true;
        let mut panel = Panel::new(link);
        panel.send("dim=10");
        panel.send("dim=10");
        assert_eq!(panel.write_failures(), 2);
    }

    #[test]
    fn poll_then_recover_after_error_marker() {
        let mut link = MockLink::new();
        link.push_inbound(&[0x1A, 0xFF, 0xFF, 0xFF, b'x']);
        let mut panel = Panel::new(link);
        let mut clock = MockClock::new();

        let err = panel.poll().unwrap_err();
        assert!(err.needs_resync());
        assert!(panel.recover(&mut clock));
        assert!(panel.poll().unwrap().is_none());
    }

    #[test]
    fn with_resync_uses_custom_settle() {
        let mut panel =
            Panel::new(MockLink::new()).with_resync(ResyncController::new().with_settle_ms(0));
        let mut clock = MockClock::new();
        panel.recover(&mut clock);
        assert_eq!(clock.slept_ms, 0);
        assert_eq!(panel.into_inner().flushes, 1);
    }
}
