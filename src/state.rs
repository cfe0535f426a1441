//! Runtime state owned by the scheduler.
//!
//! Everything the display currently shows that is not part of the
//! persisted [`DisplayConfig`](crate::config::DisplayConfig) lives here.
//! `None` fields mean "not painted yet", which forces the next write.

use std::net::IpAddr;

use crate::day_window::Brightness;
use crate::freshness::{Freshness, FreshnessTracker};
use crate::observation::Observation;
use crate::screen;

/// Mutable runtime state.
#[derive(Clone, Debug, Default)]
pub struct ClockRuntimeState {
    /// Backlight state last written to the display.
    pub brightness: Option<Brightness>,
    /// Backlight level last written to the display.
    pub applied_level: Option<u16>,
    /// Reachability at the last check.
    pub online: Option<bool>,
    /// Interface address at the last check.
    pub address: Option<IpAddr>,
    /// Last successfully parsed observation.
    pub observation: Option<Observation>,
    /// Report time of the last good observation.
    pub freshness: FreshnessTracker,
    /// Report-time color last written to the display.
    pub shown_freshness: Option<Freshness>,
    /// A configuration change needs a fresh fetch and repaint.
    pub needs_refetch: bool,
    /// The last fetch failed; the next success repaints even if unchanged.
    pub repaint_pending: bool,
}

impl ClockRuntimeState {
    /// Creates the state for a freshly booted clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Address as shown on the display.
    pub fn address_text(&self) -> String {
        self.address
            .map(|a| a.to_string())
            .unwrap_or_else(|| screen::OFFLINE.to_string())
    }

    /// True once a reachability check has found an address.
    pub fn is_online(&self) -> bool {
        self.online == Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_has_nothing_painted() {
        let state = ClockRuntimeState::new();
        assert_eq!(state.brightness, None);
        assert_eq!(state.shown_freshness, None);
        assert!(!state.needs_refetch);
        assert!(!state.is_online());
    }

    #[test]
    fn address_text_falls_back_to_offline() {
        let mut state = ClockRuntimeState::new();
        assert_eq!(state.address_text(), "Offline");

        state.address = Some(IpAddr::from([10, 0, 0, 7]));
        assert_eq!(state.address_text(), "10.0.0.7");
    }
}
