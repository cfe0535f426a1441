//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for every trait in [`crate::traits`],
//! enabling development and testing on desktop without a display, network,
//! or weather service.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockLink`] | [`SerialLink`] | In-memory byte queues, records writes and clears |
//! | [`MockClock`] | [`Clock`], [`WallClock`], [`Delay`] | Controllable simulated time |
//! | [`MockMetar`] | [`MetarSource`] | Queued observations and failures |
//! | [`MockNetwork`] | [`NetworkManager`] | Settable address, records reconfiguration |
//! | [`MockStore`] | [`ConfigStore`] | In-memory persistence, counts saves |
//!
//! # Example
//!
//! ```rust
//! use metar_clock::hal::{MockClock, MockLink};
//! use metar_clock::traits::{Clock, Delay};
//! use metar_clock::Panel;
//!
//! let mut panel = Panel::new(MockLink::new());
//! panel.send("page data");
//! assert_eq!(panel.link().frames_written(), vec!["page data".to_string()]);
//!
//! let mut clock = MockClock::new();
//! clock.delay_ms(500);
//! assert_eq!(clock.now_ms(), 500);
//! ```
//!
//! [`SerialLink`]: crate::traits::SerialLink
//! [`Clock`]: crate::traits::Clock
//! [`WallClock`]: crate::traits::WallClock
//! [`Delay`]: crate::traits::Delay
//! [`MetarSource`]: crate::traits::MetarSource
//! [`NetworkManager`]: crate::traits::NetworkManager
//! [`ConfigStore`]: crate::traits::ConfigStore

use std::collections::VecDeque;
use std::net::IpAddr;

use chrono::{DateTime, TimeDelta, Utc};

use crate::config::{DisplayConfig, WifiCredentials};
use crate::frame::TERMINATOR;
use crate::observation::Observation;
use crate::traits::{
    Clock, ConfigStore, Delay, FetchError, MetarSource, NetworkError, NetworkManager,
    PersistError, SerialLink, TransportError, WallClock,
};

// ============================================================================
// Serial Mock
// ============================================================================

/// Mock serial link for testing.
///
/// Inbound bytes are queued with [`push_inbound`](Self::push_inbound);
/// every `write_all` call is recorded as one entry in `writes`.
///
/// A write made only of `0xFF` bytes is treated as a resync flush: it is
/// counted in `flushes` and, if `flush_response` is set, those bytes are
/// queued inbound as the device's reply.
///
/// # Example
///
/// ```rust
/// use metar_clock::hal::MockLink;
/// use metar_clock::traits::SerialLink;
///
/// let mut link = MockLink::new();
/// link.write_all(b"dim=10\xff\xff\xff").unwrap();
/// link.write_all(&[0xFF; 5]).unwrap();
///
/// assert_eq!(link.frames_written(), vec!["dim=10".to_string()]);
/// assert_eq!(link.flushes, 1);
/// ```
#[derive(Debug, Default)]
pub struct MockLink {
    /// Bytes waiting to be read.
    pub inbound: VecDeque<u8>,
    /// Every `write_all` payload, in order.
    pub writes: Vec<Vec<u8>>,
    /// Number of `read` calls.
    pub reads: usize,
    /// Number of `clear_input` calls.
    pub input_clears: usize,
    /// Number of `clear_output` calls.
    pub output_clears: usize,
    /// Number of all-`0xFF` writes.
    pub flushes: usize,
    /// Bytes queued inbound whenever a flush is written.
    pub flush_response: Vec<u8>,
    /// When true, every operation fails.
    pub fail: bool,
}

impl MockLink {
    /// Creates an idle link.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue raw inbound bytes.
    pub fn push_inbound(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes.iter().copied());
    }

    /// Queue one terminated inbound frame.
    pub fn push_frame(&mut self, text: &str) {
        self.push_inbound(text.as_bytes());
        self.push_inbound(&TERMINATOR);
    }

    /// Payloads of every terminated frame written, flushes excluded.
    pub fn frames_written(&self) -> Vec<String> {
        self.writes
            .iter()
            .filter(|w| !w.iter().all(|b| *b == 0xFF))
            .filter_map(|w| w.strip_suffix(&TERMINATOR))
            .map(|payload| String::from_utf8_lossy(payload).into_owned())
            .collect()
    }

    /// Written frames that start with `prefix`.
    pub fn frames_starting_with(&self, prefix: &str) -> Vec<String> {
        self.frames_written()
            .into_iter()
            .filter(|f| f.starts_with(prefix))
            .collect()
    }

    /// Forget recorded writes.
    pub fn clear_written(&mut self) {
        self.writes.clear();
    }

    fn check(&self) -> Result<(), TransportError> {
        if self.fail {
            Err(TransportError::Port("mock link failure".into()))
        } else {
            Ok(())
        }
    }
}

impl SerialLink for MockLink {
    fn bytes_available(&mut self) -> Result<usize, TransportError> {
        self.check()?;
        Ok(self.inbound.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.check()?;
        self.reads += 1;
        let mut n = 0;
        while n < buf.len() {
            match self.inbound.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.check()?;
        if !bytes.is_empty() && bytes.iter().all(|b| *b == 0xFF) {
            self.flushes += 1;
            let reply = self.flush_response.clone();
            self.push_inbound(&reply);
        }
        self.writes.push(bytes.to_vec());
        Ok(())
    }

    fn clear_input(&mut self) -> Result<(), TransportError> {
        self.check()?;
        self.input_clears += 1;
        self.inbound.clear();
        Ok(())
    }

    fn clear_output(&mut self) -> Result<(), TransportError> {
        self.check()?;
        self.output_clears += 1;
        Ok(())
    }
}

// ============================================================================
// Time Mock
// ============================================================================

/// Mock clock for testing.
///
/// Provides controllable monotonic and calendar time. Both move together
/// on [`advance`](Self::advance), [`set`](Self::set), and
/// [`Delay::delay_ms`], so a scheduler driven by it sees a consistent world.
///
/// # Example
///
/// ```rust
/// use metar_clock::hal::MockClock;
/// use metar_clock::traits::{Clock, WallClock};
///
/// let mut clock = MockClock::new();
/// let start = clock.now_utc();
///
/// clock.set(1000);
/// assert_eq!(clock.now_ms(), 1000);
///
/// clock.advance(500);
/// assert_eq!(clock.now_ms(), 1500);
/// assert_eq!((clock.now_utc() - start).num_milliseconds(), 1500);
/// ```
#[derive(Debug)]
pub struct MockClock {
    current_ms: u64,
    wall: DateTime<Utc>,
    /// Total milliseconds spent in `delay_ms`.
    pub slept_ms: u64,
}

/// 2024-01-15T12:00:00Z
const MOCK_EPOCH_SECS: i64 = 1_705_320_000;

impl MockClock {
    /// Creates a clock at 0 ms, 2024-01-15 12:00:00 UTC.
    pub fn new() -> Self {
        Self {
            current_ms: 0,
            wall: DateTime::from_timestamp(MOCK_EPOCH_SECS, 0).unwrap_or_default(),
            slept_ms: 0,
        }
    }

    /// Creates a clock at 0 ms with the given calendar time.
    pub fn at(wall: DateTime<Utc>) -> Self {
        Self {
            wall,
            ..Self::new()
        }
    }

    /// Sets the monotonic time, moving calendar time by the same amount.
    pub fn set(&mut self, ms: u64) {
        let delta = ms as i64 - self.current_ms as i64;
        self.current_ms = ms;
        self.wall += TimeDelta::milliseconds(delta);
    }

    /// Advances the clock by the given duration.
    pub fn advance(&mut self, ms: u64) {
        self.current_ms += ms;
        self.wall += TimeDelta::milliseconds(ms as i64);
    }

    /// Replaces calendar time without touching monotonic time.
    pub fn set_wall(&mut self, wall: DateTime<Utc>) {
        self.wall = wall;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms
    }
}

impl WallClock for MockClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.wall
    }
}

impl Delay for MockClock {
    fn delay_ms(&mut self, ms: u32) {
        self.slept_ms += ms as u64;
        self.advance(ms as u64);
    }
}

// ============================================================================
// Network Mocks
// ============================================================================

/// Mock observation source for testing.
///
/// Returns queued results in FIFO order. Once the queue is empty it
/// returns `fallback` if set, otherwise [`FetchError::Unreachable`].
///
/// # Example
///
/// ```rust
/// use metar_clock::hal::MockMetar;
/// use metar_clock::traits::{FetchError, MetarSource};
///
/// let mut metar = MockMetar::new();
/// metar.push_err(FetchError::Forbidden);
///
/// assert_eq!(metar.fetch("KLWC"), Err(FetchError::Forbidden));
/// assert!(metar.fetch("KLWC").is_err());
/// assert_eq!(metar.requested, vec!["KLWC", "KLWC"]);
/// ```
#[derive(Debug, Default)]
pub struct MockMetar {
    /// Results returned by upcoming fetches.
    pub queue: VecDeque<Result<Observation, FetchError>>,
    /// Returned when the queue is empty.
    pub fallback: Option<Observation>,
    /// Station passed to every fetch, in order.
    pub requested: Vec<String>,
}

impl MockMetar {
    /// Creates a source with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source that always returns `obs`.
    pub fn always(obs: Observation) -> Self {
        Self {
            fallback: Some(obs),
            ..Self::default()
        }
    }

    /// Queue a successful fetch.
    pub fn push_ok(&mut self, obs: Observation) {
        self.queue.push_back(Ok(obs));
    }

    /// Queue a failed fetch.
    pub fn push_err(&mut self, err: FetchError) {
        self.queue.push_back(Err(err));
    }
}

impl MetarSource for MockMetar {
    fn fetch(&mut self, station: &str) -> Result<Observation, FetchError> {
        self.requested.push(station.to_string());
        match self.queue.pop_front() {
            Some(result) => result,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| FetchError::Unreachable("no canned response".into())),
        }
    }
}

/// Mock network manager for testing.
///
/// # Example
///
/// ```rust
/// use metar_clock::hal::MockNetwork;
/// use metar_clock::traits::NetworkManager;
///
/// let mut net = MockNetwork::offline();
/// assert!(!net.is_online());
///
/// net.address = Some("192.168.1.20".parse().unwrap());
/// assert!(net.is_online());
/// ```
#[derive(Debug, Default)]
pub struct MockNetwork {
    /// Address reported by `address()`.
    pub address: Option<IpAddr>,
    /// Credentials passed to `connect`, in order.
    pub connects: Vec<WifiCredentials>,
    /// SSIDs passed to `forget`, in order.
    pub forgotten: Vec<String>,
    /// When true, `connect` and `forget` fail.
    pub fail_commands: bool,
}

impl MockNetwork {
    /// Creates an online network at 192.168.1.50.
    pub fn online() -> Self {
        Self {
            address: Some(IpAddr::from([192, 168, 1, 50])),
            ..Self::default()
        }
    }

    /// Creates a network with no address.
    pub fn offline() -> Self {
        Self::default()
    }
}

impl NetworkManager for MockNetwork {
    fn address(&mut self) -> Option<IpAddr> {
        self.address
    }

    fn connect(&mut self, credentials: &WifiCredentials) -> Result<(), NetworkError> {
        self.connects.push(credentials.clone());
        if self.fail_commands {
            return Err(NetworkError::Command("mock connect failure".into()));
        }
        Ok(())
    }

    fn forget(&mut self, ssid: &str) -> Result<(), NetworkError> {
        self.forgotten.push(ssid.to_string());
        if self.fail_commands {
            return Err(NetworkError::Command("mock forget failure".into()));
        }
        Ok(())
    }
}

// ============================================================================
// Storage Mock
// ============================================================================

/// Mock configuration store for testing.
#[derive(Debug, Default)]
pub struct MockStore {
    /// Last saved (or preloaded) configuration.
    pub stored: Option<DisplayConfig>,
    /// Number of successful saves.
    pub saves: usize,
    /// When true, `save` fails.
    pub fail_saves: bool,
}

impl MockStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store preloaded with `config`.
    pub fn with(config: DisplayConfig) -> Self {
        Self {
            stored: Some(config),
            ..Self::default()
        }
    }
}

impl ConfigStore for MockStore {
    fn load(&mut self) -> Result<DisplayConfig, PersistError> {
        Ok(self.stored.clone().unwrap_or_default())
    }

    fn save(&mut self, config: &DisplayConfig) -> Result<(), PersistError> {
        if self.fail_saves {
            return Err(PersistError::Format("mock save failure".into()));
        }
        self.stored = Some(config.clone());
        self.saves += 1;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
