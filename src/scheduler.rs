//! The cooperative main loop.
//!
//! [`Scheduler`] owns every collaborator and all mutable state. Each
//! [`tick`](Scheduler::tick) reads the monotonic clock once and decides
//! what is due:
//!
//! | Task | Cadence |
//! |------|---------|
//! | Housekeeping (network, clock text, backlight, freshness) | every 5 s |
//! | Observation refresh | every 300 s, or early when a refetch is pending and the network is up |
//! | Inbound command poll | every tick |
//!
//! A successfully dispatched command re-runs housekeeping and refresh in
//! the same tick and restarts both cadences from that moment.
//!
//! # Example
//!
//! ```rust
//! use metar_clock::config::DisplayConfig;
//! use metar_clock::hal::{MockClock, MockLink, MockMetar, MockNetwork, MockStore};
//! use metar_clock::{Panel, Scheduler};
//!
//! let mut scheduler = Scheduler::new(
//!     Panel::new(MockLink::new()),
//!     MockClock::new(),
//!     MockMetar::new(),
//!     MockNetwork::online(),
//!     MockStore::new(),
//!     DisplayConfig::default(),
//! );
//!
//! assert!(!scheduler.tick().housekeeping);
//!
//! scheduler.clock_mut().advance(5_000);
//! assert!(scheduler.tick().housekeeping);
//! ```
//!
//! No failure inside a tick is fatal. Transport, decode, dispatch, fetch,
//! persistence, and network errors are logged and the loop carries on.

use core::mem;

use chrono::NaiveTime;
use tracing::{debug, error, info, warn};

use crate::config::DisplayConfig;
use crate::day_window::{self, Brightness};
use crate::dispatch::{CommandDispatcher, DispatchOutcome, NetworkChange};
use crate::freshness::Freshness;
use crate::panel::Panel;
use crate::screen::{self, widget};
use crate::state::ClockRuntimeState;
use crate::traits::{Clock, ConfigStore, Delay, MetarSource, NetworkManager, SerialLink, WallClock};

/// Nominal sleep between ticks.
pub const TICK_MS: u32 = 500;

/// Minimum time between housekeeping passes.
pub const HOUSEKEEPING_INTERVAL_MS: u64 = 5_000;

/// Minimum time between scheduled observation refreshes.
pub const REFRESH_INTERVAL_MS: u64 = 300_000;

/// Startup polls for an address this many times while offline.
pub const STARTUP_WAIT_STEPS: usize = 72;

/// Delay between startup address polls.
pub const STARTUP_WAIT_STEP_MS: u32 = 100;

/// How long the splash page keeps the address on screen.
pub const ADDRESS_HOLD_MS: u32 = 2_000;

/// What a single [`Scheduler::tick`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Housekeeping ran.
    pub housekeeping: bool,
    /// An observation refresh ran.
    pub refresh: bool,
    /// A command was dispatched.
    pub command: bool,
}

/// Owns the display, the collaborators, and all runtime state.
///
/// # Type Parameters
///
/// - `L`: serial link to the display ([`SerialLink`])
/// - `C`: time source, also used for every delay
/// - `M`: observation source ([`MetarSource`])
/// - `N`: host network ([`NetworkManager`])
/// - `S`: configuration persistence ([`ConfigStore`])
pub struct Scheduler<L, C, M, N, S> {
    panel: Panel<L>,
    clock: C,
    metar: M,
    network: N,
    store: S,
    config: DisplayConfig,
    state: ClockRuntimeState,
    dispatcher: CommandDispatcher,
    last_housekeeping_ms: u64,
    last_refresh_ms: u64,
}

impl<L, C, M, N, S> Scheduler<L, C, M, N, S>
where
    L: SerialLink,
    C: Clock + WallClock + Delay,
    M: MetarSource,
    N: NetworkManager,
    S: ConfigStore,
{
    /// Create a scheduler. Both cadences start counting from now.
    pub fn new(
        panel: Panel<L>,
        clock: C,
        metar: M,
        network: N,
        store: S,
        config: DisplayConfig,
    ) -> Self {
        let now = clock.now_ms();
        Self {
            panel,
            clock,
            metar,
            network,
            store,
            config,
            state: ClockRuntimeState::new(),
            dispatcher: CommandDispatcher::new(),
            last_housekeeping_ms: now,
            last_refresh_ms: now,
        }
    }

    // ========================================================================
    // Loop
    // ========================================================================

    /// Bring the display up: splash, wait for the network, fill the
    /// settings page, set the backlight, and show the first observation.
    pub fn startup(&mut self) {
        info!(station = %self.config.station, zone = %self.config.zone, "starting up");
        self.panel.send(&screen::page(widget::PAGE_SPLASH));

        let mut step = 0;
        while step < STARTUP_WAIT_STEPS && !self.network.is_online() {
            let frame = screen::SPINNER[step % screen::SPINNER.len()];
            self.panel
                .send(&screen::set_text(widget::SPLASH_ADDRESS, frame));
            self.clock.delay_ms(STARTUP_WAIT_STEP_MS);
            step += 1;
        }

        self.panel.send_all(screen::speed_unit(self.config.speed_unit));
        self.state.online = None;
        self.check_network();
        let address = self.state.address_text();
        self.panel
            .send(&screen::set_text(widget::SPLASH_ADDRESS, &address));
        self.clock.delay_ms(ADDRESS_HOLD_MS);

        self.panel
            .send_all(screen::settings_page(&self.config, &address));
        let local = self.config.zone.localize(self.clock.now_utc());
        self.apply_brightness(local.time, true);
        self.panel.send(&screen::page(widget::PAGE_DATA));

        self.state.needs_refetch = true;
        self.refresh();

        let now = self.clock.now_ms();
        self.last_housekeeping_ms = now;
        self.last_refresh_ms = now;
    }

    /// Run one loop iteration.
    ///
    /// A dispatched command runs housekeeping and refresh once and restarts
    /// both intervals; otherwise each runs when it is due.
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now_ms();

        if self.poll_command() {
            self.housekeeping();
            self.refresh();
            self.last_housekeeping_ms = now;
            self.last_refresh_ms = now;
            return TickReport {
                housekeeping: true,
                refresh: true,
                command: true,
            };
        }

        let mut report = TickReport::default();
        if now.saturating_sub(self.last_housekeeping_ms) >= HOUSEKEEPING_INTERVAL_MS {
            self.housekeeping();
            self.last_housekeeping_ms = now;
            report.housekeeping = true;
        }

        let refresh_due = now.saturating_sub(self.last_refresh_ms) >= REFRESH_INTERVAL_MS;
        if refresh_due || (self.state.needs_refetch && self.state.is_online()) {
            self.refresh();
            self.last_refresh_ms = now;
            report.refresh = true;
        }

        report
    }

    /// Tick forever.
    pub fn run(&mut self) -> ! {
        loop {
            self.tick();
            self.clock.delay_ms(TICK_MS);
        }
    }

    // ========================================================================
    // Housekeeping
    // ========================================================================

    /// Network status, clock text, backlight, and freshness color.
    pub fn housekeeping(&mut self) {
        self.check_network();
        let local = self.config.zone.localize(self.clock.now_utc());
        self.panel.send(&screen::clock(&local.label));
        self.apply_brightness(local.time, false);
        self.check_freshness();
    }

    /// Poll the interface address, repainting the WiFi icons on change.
    fn check_network(&mut self) -> bool {
        let address = self.network.address();
        let online = address.is_some();

        if self.state.online != Some(online) || self.state.address != address {
            match address {
                Some(addr) => info!(%addr, "network up"),
                None => warn!("network down"),
            }
            self.state.online = Some(online);
            self.state.address = address;
            let text = self.state.address_text();
            self.panel.send_all(screen::network_status(online, &text));
        }
        online
    }

    /// Write the backlight level if the window state or level changed.
    fn apply_brightness(&mut self, now: NaiveTime, force: bool) {
        let brightness =
            match day_window::evaluate(now, self.config.bright_start, self.config.dim_start) {
                Ok(b) => b,
                Err(e) => {
                    error!(error = %e, "invalid day window, staying bright");
                    Brightness::Bright
                }
            };
        let level = match brightness {
            Brightness::Bright => self.config.bright_level,
            Brightness::Dim => self.config.dim_level,
        };

        if force
            || self.state.brightness != Some(brightness)
            || self.state.applied_level != Some(level)
        {
            debug!(?brightness, level, "backlight change");
            self.panel.send(&screen::brightness(level));
            self.state.brightness = Some(brightness);
            self.state.applied_level = Some(level);
        }
    }

    /// Recolor the report time if its freshness changed.
    fn check_freshness(&mut self) {
        let freshness = self.state.freshness.check(self.clock.now_utc());
        if self.state.shown_freshness == Some(freshness) {
            return;
        }
        if freshness == Freshness::Stale {
            warn!(last_report = ?self.state.freshness.last_report(), "observation is stale");
        }
        self.panel.send(&screen::freshness(freshness));
        self.state.shown_freshness = Some(freshness);
    }

    // ========================================================================
    // Observation refresh
    // ========================================================================

    /// Fetch the configured station and repaint the data page if needed.
    pub fn refresh(&mut self) {
        let refetch = mem::take(&mut self.state.needs_refetch);
        let repaint = mem::take(&mut self.state.repaint_pending);

        let online = match self.state.online {
            Some(online) => online,
            None => self.check_network(),
        };
        if !online {
            warn!(station = %self.config.station, "offline, skipping observation fetch");
            self.state.needs_refetch |= refetch;
            self.state.repaint_pending |= repaint;
            return;
        }

        match self.metar.fetch(&self.config.station) {
            Ok(obs) => {
                self.state.freshness.record(obs.report_time);
                if refetch || repaint || self.state.observation.as_ref() != Some(&obs) {
                    info!(station = %obs.station, report_time = %obs.report_time, "new observation");
                    self.panel.send_all(screen::observation(
                        &obs,
                        &self.config.station,
                        self.config.speed_unit,
                        self.config.zone,
                    ));
                    self.state.shown_freshness = Some(Freshness::Fresh);
                } else {
                    debug!(station = %obs.station, "observation unchanged");
                }
                self.state.observation = Some(obs);
            }
            Err(e) => {
                error!(station = %self.config.station, error = %e, "observation fetch failed");
                self.panel
                    .send_all(screen::fetch_failure(&self.config.station, &e.to_string()));
                self.state.repaint_pending = true;
            }
        }

        self.check_freshness();
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Decode and dispatch one inbound frame. Returns true if a command
    /// was applied.
    fn poll_command(&mut self) -> bool {
        match self.panel.poll() {
            Ok(None) => false,
            Ok(Some(decoded)) => {
                if let Some(anomaly) = &decoded.anomaly {
                    warn!(?anomaly, "discarded bytes after frame");
                }
                // Only the verb is logged; WFI frames carry a password
                let verb = decoded.text.get(..3).unwrap_or(decoded.text.as_str());
                match self.dispatcher.dispatch(&decoded.text, &mut self.config) {
                    Ok(outcome) => {
                        info!(verb, "command applied");
                        self.apply_outcome(outcome);
                        true
                    }
                    Err(e) => {
                        warn!(verb, error = %e, "command rejected");
                        false
                    }
                }
            }
            Err(e) if e.needs_resync() => {
                warn!(error = %e, "unusable inbound frame, resynchronizing");
                self.panel.recover(&mut self.clock);
                false
            }
            Err(e) => {
                error!(error = %e, "serial read failed");
                false
            }
        }
    }

    fn apply_outcome(&mut self, outcome: DispatchOutcome) {
        self.panel.send_all(&outcome.display);
        if let Err(e) = self.store.save(&self.config) {
            error!(error = %e, "failed to save configuration");
        }
        if let Some(change) = &outcome.network_change {
            self.reconfigure_network(change);
        }
        self.state.needs_refetch |= outcome.refetch;
    }

    fn reconfigure_network(&mut self, change: &NetworkChange) {
        if let Err(e) = self.network.connect(&change.credentials) {
            error!(ssid = %change.credentials.ssid, error = %e, "failed to join network");
        }
        if let Some(stale) = change.stale_profile() {
            if let Err(e) = self.network.forget(stale) {
                warn!(ssid = stale, error = %e, "failed to remove old network profile");
            }
        }
        self.state.online = None;
        self.check_network();
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current display configuration.
    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Current runtime state.
    pub fn state(&self) -> &ClockRuntimeState {
        &self.state
    }

    /// The display endpoint.
    pub fn panel(&self) -> &Panel<L> {
        &self.panel
    }

    /// Mutable display endpoint, e.g. to queue inbound bytes in tests.
    pub fn panel_mut(&mut self) -> &mut Panel<L> {
        &mut self.panel
    }

    /// The time source.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Mutable time source.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// The observation source.
    pub fn metar(&self) -> &M {
        &self.metar
    }

    /// Mutable observation source.
    pub fn metar_mut(&mut self) -> &mut M {
        &mut self.metar
    }

    /// The network manager.
    pub fn network(&self) -> &N {
        &self.network
    }

    /// Mutable network manager.
    pub fn network_mut(&mut self) -> &mut N {
        &mut self.network
    }

    /// The configuration store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Monotonic time of the last housekeeping pass.
    pub fn last_housekeeping_ms(&self) -> u64 {
        self.last_housekeeping_ms
    }

    /// Monotonic time of the last observation refresh.
    pub fn last_refresh_ms(&self) -> u64 {
        self.last_refresh_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimeOfDay;
    use crate::hal::{MockClock, MockLink, MockMetar, MockNetwork, MockStore};
    use crate::observation::Observation;

    type TestScheduler = Scheduler<MockLink, MockClock, MockMetar, MockNetwork, MockStore>;

    fn observation(report_time: &str) -> Observation {
        Observation::from_json(&format!(
            r#"[{{"icaoId":"KLWC","reportTime":"{report_time}","wspd":5,"temp":10.0}}]"#
        ))
        .unwrap()
    }

    fn scheduler(metar: MockMetar, network: MockNetwork, config: DisplayConfig) -> TestScheduler {
        Scheduler::new(
            Panel::new(MockLink::new()),
            MockClock::new(),
            metar,
            network,
            MockStore::new(),
            config,
        )
    }

    #[test]
    fn startup_shows_data_page_with_observation() {
        let obs = observation("2024-01-15T11:53:00Z");
        let mut s = scheduler(
            MockMetar::always(obs.clone()),
            MockNetwork::online(),
            DisplayConfig::default(),
        );
        s.startup();

        let written = s.panel().link().frames_written();
        assert_eq!(written[0], "page splash");
        assert!(written.contains(&"splash.ipaddr.txt=\"192.168.1.50\"".to_string()));
        assert!(written.contains(&"page data".to_string()));
        assert!(written.contains(&"data.stat.txt=\"KLWC\"".to_string()));
        assert_eq!(s.state().observation, Some(obs));
        assert_eq!(s.clock().slept_ms, u64::from(ADDRESS_HOLD_MS));
        assert_eq!(s.last_refresh_ms(), s.clock().now_ms());
    }

    #[test]
    fn startup_spins_while_offline() {
        let mut s = scheduler(MockMetar::new(), MockNetwork::offline(), DisplayConfig::default());
        s.startup();

        let spinner = s
            .panel()
            .link()
            .frames_starting_with("splash.ipaddr.txt=");
        assert_eq!(spinner.len(), STARTUP_WAIT_STEPS + 1);
        assert_eq!(spinner.last().unwrap(), "splash.ipaddr.txt=\"Offline\"");
        assert!(s.metar().requested.is_empty());
        assert!(s.state().needs_refetch);
    }

    #[test]
    fn invalid_window_falls_back_to_bright() {
        let config = DisplayConfig::default()
            .with_bright_start(TimeOfDay::new(25, 0))
            .with_levels(90, 5);
        let mut s = scheduler(MockMetar::new(), MockNetwork::online(), config);
        s.housekeeping();
        assert_eq!(s.state().brightness, Some(Brightness::Bright));
        assert_eq!(s.panel().link().frames_starting_with("dim="), vec!["dim=90"]);
    }

    #[test]
    fn unchanged_observation_is_not_repainted() {
        let obs = observation("2024-01-15T11:53:00Z");
        let mut s = scheduler(
            MockMetar::always(obs),
            MockNetwork::online(),
            DisplayConfig::default(),
        );
        s.refresh();
        let painted = s.panel().link().frames_starting_with("data.stat.txt=").len();
        s.refresh();
        assert_eq!(
            s.panel().link().frames_starting_with("data.stat.txt=").len(),
            painted
        );
    }
}
