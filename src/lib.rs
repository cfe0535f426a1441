//! # metar-clock
//!
//! Engine for a wall clock that shows the latest aviation weather report
//! (METAR) on a serial touchscreen, with the time, a day/night backlight
//! schedule, and an on-screen settings page.
//!
//! ## Features
//!
//! - **Display protocol**: text instructions framed by `FF FF FF`, with
//!   error detection and a resync procedure that recovers alignment
//! - **Operator commands**: station, zone, speed unit, backlight schedule,
//!   and WiFi credentials entered on the touchscreen
//! - **Backlight schedule**: bright/dim windows that may span midnight
//! - **Staleness**: the report time turns red once the report is over an
//!   hour old
//! - **Cooperative scheduler**: 0.5 s tick, 5 s housekeeping, 5 min
//!   observation refresh
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Serial link, time, observation source, network, persistence
//! - `frame` / `resync` / `panel` - Display protocol
//! - `commands` / `dispatch` - Operator command parsing and application
//! - `day_window` / `freshness` - Pure decisions for backlight and staleness
//! - `scheduler` - Main loop that ties everything together
//! - `hal` - Concrete implementations (mock for testing, linux for hardware)
//!
//! ## Example
//!
//! ```rust
//! use metar_clock::{
//!     Panel, Scheduler,
//!     config::DisplayConfig,
//!     hal::{MockClock, MockLink, MockMetar, MockNetwork, MockStore},
//! };
//!
//! let mut link = MockLink::new();
//! link.push_frame("STAkbos");
//!
//! let mut scheduler = Scheduler::new(
//!     Panel::new(link),
//!     MockClock::new(),
//!     MockMetar::new(),
//!     MockNetwork::online(),
//!     MockStore::new(),
//!     DisplayConfig::default(),
//! );
//!
//! // A dispatched command runs housekeeping and refresh immediately
//! let report = scheduler.tick();
//! assert!(report.command && report.housekeeping && report.refresh);
//! assert_eq!(scheduler.config().station.as_str(), "KBOS");
//! assert_eq!(scheduler.metar().requested, vec!["KBOS"]);
//! ```

#![warn(missing_docs)]

/// Operator command parsing.
pub mod commands;
/// Persisted display configuration and its value types.
pub mod config;
/// Bright/dim decision from time of day.
pub mod day_window;
/// Command application against the configuration.
pub mod dispatch;
/// Display frame encoding and decoding.
pub mod frame;
/// Observation age tracking.
pub mod freshness;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Tracing subscriber setup.
pub mod logging;
/// Parsed weather observations.
pub mod observation;
/// Display writer and inbound poller.
pub mod panel;
/// Link recovery after a framing error.
pub mod resync;
/// Main loop with housekeeping and refresh cadences.
pub mod scheduler;
/// Display instruction builders and page renderers.
pub mod screen;
/// Runtime state owned by the scheduler.
pub mod state;
/// TOML configuration file store.
pub mod store;
/// Core traits for hardware, network, and storage abstraction.
pub mod traits;

// Re-exports for convenience
pub use commands::{Command, DispatchError, Verb};
pub use config::{DisplayConfig, SpeedUnit, TimeOfDay, WifiCredentials, ZoneKey};
pub use day_window::{Brightness, WindowError};
pub use dispatch::{CommandDispatcher, DispatchOutcome, NetworkChange};
pub use frame::{DecodeError, Decoded, FrameAnomaly};
pub use freshness::{Freshness, FreshnessTracker};
pub use observation::Observation;
pub use panel::Panel;
pub use resync::ResyncController;
pub use scheduler::{Scheduler, TickReport};
pub use state::ClockRuntimeState;
pub use traits::{
    // Hardware
    Clock,
    // Storage
    ConfigStore,
    Delay,
    // Network
    FetchError,
    MetarSource,
    NetworkError,
    NetworkManager,
    PersistError,
    SerialLink,
    TransportError,
    WallClock,
};
