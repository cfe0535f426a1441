//! Operator commands sent from the settings page.
//!
//! A command frame is a three-letter verb immediately followed by its
//! argument: `STAKJFK`, `DIM22:30`, `BRV100`, `WFIhangar:password:secret`.
//!
//! | Verb | Argument | Command |
//! |------|----------|---------|
//! | `STA` | station id | [`Command::SelectStation`] |
//! | `DIM` | `H:MM` | [`Command::SetDimTime`] |
//! | `BRT` | `H:MM` | [`Command::SetBrightTime`] |
//! | `DMV` | integer | [`Command::SetDimLevel`] |
//! | `BRV` | integer | [`Command::SetBrightLevel`] |
//! | `SPU` | ignored | [`Command::ToggleSpeedUnit`] |
//! | `TZD` | zone key | [`Command::SelectTimeZone`] |
//! | `WFI` | `ssid:password:pw` | [`Command::SetWifi`] |
//!
//! Parsing checks shape only. Range checks that fall back to the previous
//! value happen in [`CommandDispatcher`](crate::CommandDispatcher).
//!
//! # Example
//!
//! ```rust
//! use metar_clock::{Command, DispatchError};
//! use metar_clock::config::ZoneKey;
//!
//! assert_eq!(Command::parse("TZDct"), Ok(Command::SelectTimeZone(ZoneKey::Central)));
//! assert_eq!(Command::parse("STAkjfk"), Ok(Command::SelectStation("KJFK".into())));
//! assert!(matches!(Command::parse("XYZ1"), Err(DispatchError::UnknownVerb(_))));
//! ```

use core::fmt;
use core::num::IntErrorKind;
use core::str::FromStr;

use thiserror::Error;

use crate::config::{WifiCredentials, ZoneKey};

// ============================================================================
// Verbs
// ============================================================================

/// The closed set of command verbs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    /// `STA`: select station.
    Station,
    /// `DIM`: dim window start.
    DimTime,
    /// `BRT`: bright window start.
    BrightTime,
    /// `DMV`: dim backlight level.
    DimLevel,
    /// `BRV`: bright backlight level.
    BrightLevel,
    /// `SPU`: toggle speed unit.
    SpeedUnit,
    /// `TZD`: select time zone.
    TimeZone,
    /// `WFI`: WiFi credentials.
    Wifi,
}

impl Verb {
    /// Every verb.
    pub const ALL: [Verb; 8] = [
        Verb::Station,
        Verb::DimTime,
        Verb::BrightTime,
        Verb::DimLevel,
        Verb::BrightLevel,
        Verb::SpeedUnit,
        Verb::TimeZone,
        Verb::Wifi,
    ];

    /// Three-letter wire form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Verb::Station => "STA",
            Verb::DimTime => "DIM",
            Verb::BrightTime => "BRT",
            Verb::DimLevel => "DMV",
            Verb::BrightLevel => "BRV",
            Verb::SpeedUnit => "SPU",
            Verb::TimeZone => "TZD",
            Verb::Wifi => "WFI",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| DispatchError::UnknownVerb(s.to_string()))
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Why a command frame was rejected. No configuration change is made.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The first three characters are not a known verb.
    #[error("unknown command verb {0:?}")]
    UnknownVerb(String),

    /// The verb is known but its argument is malformed.
    #[error("invalid argument {argument:?} for {verb}: {reason}")]
    InvalidArgument {
        /// Verb whose argument failed.
        verb: Verb,
        /// Argument as received.
        argument: String,
        /// What was wrong.
        reason: &'static str,
    },
}

// ============================================================================
// Commands
// ============================================================================

/// An `H:MM` argument as typed, before range checking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestedTime {
    /// Hour as entered.
    pub hour: u32,
    /// Minute as entered.
    pub minute: u32,
}

/// A parsed operator command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Show observations for a new station. Stored uppercase.
    SelectStation(String),

    /// Move the dim window start.
    SetDimTime(RequestedTime),

    /// Move the bright window start.
    SetBrightTime(RequestedTime),

    /// Set the dim backlight level.
    ///
    /// Not range-checked; the display clamps to 0-100 itself.
    SetDimLevel(u16),

    /// Set the bright backlight level.
    SetBrightLevel(u16),

    /// Switch between knots and mph. Any argument is ignored.
    ToggleSpeedUnit,

    /// Change the clock zone.
    SelectTimeZone(ZoneKey),

    /// Join a different WiFi network.
    SetWifi(WifiCredentials),
}

/// Separator between SSID and password in a `WFI` argument.
pub const WIFI_SEPARATOR: &str = ":password:";

impl Command {
    /// Parse a decoded frame.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::UnknownVerb`] when the frame does not start with a
    ///   known verb (including frames shorter than three bytes)
    /// - [`DispatchError::InvalidArgument`] when the argument has the wrong
    ///   shape for its verb
    pub fn parse(frame: &str) -> Result<Self, DispatchError> {
        let (verb, arg) = match (frame.get(..3), frame.get(3..)) {
            (Some(v), Some(a)) => (v.parse::<Verb>()?, a),
            _ => return Err(DispatchError::UnknownVerb(frame.to_string())),
        };
        let invalid = |reason: &'static str| DispatchError::InvalidArgument {
            verb,
            argument: arg.to_string(),
            reason,
        };

        let command = match verb {
            Verb::Station => Command::SelectStation(arg.trim().to_uppercase()),
            Verb::DimTime => {
                Command::SetDimTime(parse_time(arg).ok_or_else(|| invalid("expected H:MM"))?)
            }
            Verb::BrightTime => {
                Command::SetBrightTime(parse_time(arg).ok_or_else(|| invalid("expected H:MM"))?)
            }
            Verb::DimLevel => Command::SetDimLevel(
                arg.trim()
                    .parse()
                    .map_err(|_| invalid("expected an integer level"))?,
            ),
            Verb::BrightLevel => Command::SetBrightLevel(
                arg.trim()
                    .parse()
                    .map_err(|_| invalid("expected an integer level"))?,
            ),
            Verb::SpeedUnit => Command::ToggleSpeedUnit,
            Verb::TimeZone => Command::SelectTimeZone(
                arg.parse()
                    .map_err(|_| invalid("expected one of ut, et, ct, mt, pt, lt"))?,
            ),
            Verb::Wifi => {
                let (ssid, password) = arg
                    .split_once(WIFI_SEPARATOR)
                    .ok_or_else(|| invalid("expected <ssid>:password:<password>"))?;
                Command::SetWifi(WifiCredentials::new(ssid, password))
            }
        };
        Ok(command)
    }

    /// The verb this command was parsed from.
    pub fn verb(&self) -> Verb {
        match self {
            Command::SelectStation(_) => Verb::Station,
            Command::SetDimTime(_) => Verb::DimTime,
            Command::SetBrightTime(_) => Verb::BrightTime,
            Command::SetDimLevel(_) => Verb::DimLevel,
            Command::SetBrightLevel(_) => Verb::BrightLevel,
            Command::ToggleSpeedUnit => Verb::SpeedUnit,
            Command::SelectTimeZone(_) => Verb::TimeZone,
            Command::SetWifi(_) => Verb::Wifi,
        }
    }
}

fn parse_time(arg: &str) -> Option<RequestedTime> {
    let (h, m) = arg.trim().split_once(':')?;
    Some(RequestedTime {
        hour: parse_time_field(h)?,
        minute: parse_time_field(m)?,
    })
}

/// Numbers too large for `u32` saturate so range checking reverts the field.
fn parse_time_field(field: &str) -> Option<u32> {
    match field.trim().parse::<u32>() {
        Ok(value) => Some(value),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(u32::MAX),
        Err(_) => None,
    }
}
