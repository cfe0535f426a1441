//! Applies operator commands to the display configuration.
//!
//! [`CommandDispatcher::dispatch`] parses a frame, validates it against the
//! current configuration, and mutates that configuration. Side effects that
//! reach outside the configuration (display echoes, refetching, WiFi
//! changes) are returned in a [`DispatchOutcome`] for the scheduler to
//! carry out.

use tracing::{info, warn};

use crate::commands::{Command, DispatchError, RequestedTime};
use crate::config::{short_string, DisplayConfig, ShortString, TimeOfDay, WifiCredentials};
use crate::screen::{self, widget};

/// Highest hour accepted for a window boundary (24 means end of day).
pub const MAX_HOUR: u32 = 24;

/// Highest minute accepted for a window boundary.
pub const MAX_MINUTE: u32 = 59;

/// A WiFi reconfiguration requested by a `WFI` command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkChange {
    /// Credentials to connect with.
    pub credentials: WifiCredentials,
    /// SSID configured before the change; its profile is removed if different.
    pub previous_ssid: ShortString,
}

impl NetworkChange {
    /// The old profile to remove, if any.
    pub fn stale_profile(&self) -> Option<&str> {
        let prev = self.previous_ssid.as_str();
        (!prev.is_empty() && prev != self.credentials.ssid.as_str()).then_some(prev)
    }
}

/// What the scheduler must do after a command was applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Instructions that echo the change on the display.
    pub display: Vec<String>,
    /// The observation must be fetched and repainted.
    pub refetch: bool,
    /// WiFi reconfiguration to perform.
    pub network_change: Option<NetworkChange>,
}

/// Parses, validates, and applies command frames.
///
/// # Example
///
/// ```rust
/// use metar_clock::config::{DisplayConfig, TimeOfDay};
/// use metar_clock::CommandDispatcher;
///
/// let mut config = DisplayConfig::default().with_dim_start(TimeOfDay::new(21, 0));
/// let outcome = CommandDispatcher::new().dispatch("DIM30:70", &mut config).unwrap();
///
/// // Both fields out of range: previous values kept
/// assert_eq!(config.dim_start, TimeOfDay::new(21, 0));
/// assert_eq!(outcome.display, vec!["settings.dim_on.txt=\"21:00\"".to_string()]);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Creates a dispatcher.
    pub const fn new() -> Self {
        Self
    }

    /// Parse `frame` and apply it to `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] without touching `config` when the verb is
    /// unknown or the argument is malformed.
    pub fn dispatch(
        &self,
        frame: &str,
        config: &mut DisplayConfig,
    ) -> Result<DispatchOutcome, DispatchError> {
        let command = Command::parse(frame)?;
        Ok(self.apply(command, config))
    }

    /// Apply an already parsed command.
    pub fn apply(&self, command: Command, config: &mut DisplayConfig) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();

        match command {
            Command::SelectStation(station) => {
                config.station = short_string(&station);
                info!(station = %config.station, "new station selected");
                outcome
                    .display
                    .push(screen::set_text(widget::SETTINGS_STATION, &config.station));
                outcome.refetch = true;
            }
            Command::SetDimTime(requested) => {
                config.dim_start = resolve_time(requested, config.dim_start, "dim");
                info!(at = %config.dim_start, "dim window start changed");
                outcome.display.push(screen::set_text(
                    widget::SETTINGS_DIM_ON,
                    &config.dim_start.to_string(),
                ));
            }
            Command::SetBrightTime(requested) => {
                config.bright_start = resolve_time(requested, config.bright_start, "bright");
                info!(at = %config.bright_start, "bright window start changed");
                outcome.display.push(screen::set_text(
                    widget::SETTINGS_BRIGHT_ON,
                    &config.bright_start.to_string(),
                ));
            }
            Command::SetDimLevel(level) => {
                config.dim_level = level;
                info!(level, "dim level changed");
            }
            Command::SetBrightLevel(level) => {
                config.bright_level = level;
                info!(level, "bright level changed");
            }
            Command::ToggleSpeedUnit => {
                config.speed_unit = config.speed_unit.toggled();
                info!(unit = config.speed_unit.label(), "speed unit changed");
                outcome.display = screen::speed_unit(config.speed_unit);
                outcome.refetch = true;
            }
            Command::SelectTimeZone(zone) => {
                config.zone = zone;
                info!(%zone, "time zone changed");
                outcome.display = screen::zone_selection(zone);
                outcome.refetch = true;
            }
            Command::SetWifi(credentials) => {
                let previous_ssid = config.wifi.ssid.clone();
                config.wifi = credentials.clone();
                info!(ssid = %config.wifi.ssid, "new WiFi network selected");
                outcome.display = screen::wifi_fields(config);
                outcome.network_change = Some(NetworkChange {
                    credentials,
                    previous_ssid,
                });
                outcome.refetch = true;
            }
        }

        outcome
    }
}

/// Range-check a requested boundary, keeping the previous hour or minute
/// for whichever component is out of range.
fn resolve_time(requested: RequestedTime, previous: TimeOfDay, which: &str) -> TimeOfDay {
    let hour = if requested.hour > MAX_HOUR {
        warn!(which, hour = requested.hour, keep = previous.hour, "invalid hour, keeping previous");
        previous.hour
    } else {
        requested.hour as u8
    };
    let minute = if requested.minute > MAX_MINUTE {
        warn!(which, minute = requested.minute, keep = previous.minute, "invalid minute, keeping previous");
        previous.minute
    } else {
        requested.minute as u8
    };
    TimeOfDay::new(hour, minute)
}
