//! Display configuration: station, time zone, units, brightness schedule,
//! and WiFi credentials.
//!
//! Uses `heapless::String` for bounded identifiers, with builder-style
//! setters for construction in tests and at startup.
//!
//! # Example
//!
//! ```rust
//! use metar_clock::config::{DisplayConfig, SpeedUnit, TimeOfDay, ZoneKey};
//!
//! // Use defaults
//! let config = DisplayConfig::default();
//! assert_eq!(config.station.as_str(), "KLWC");
//!
//! // Or customize
//! let config = DisplayConfig::default()
//!     .with_station("kjfk")
//!     .with_zone(ZoneKey::Eastern)
//!     .with_speed_unit(SpeedUnit::Mph)
//!     .with_bright_start(TimeOfDay::new(8, 0))
//!     .with_dim_start(TimeOfDay::new(20, 0));
//! assert_eq!(config.station.as_str(), "KJFK");
//! ```

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Local, NaiveTime, Utc};
use chrono_tz::Tz;
use heapless::String as HString;
use serde::{Deserialize, Serialize};

/// Maximum length for short config strings (station ids, SSIDs, passwords)
pub const MAX_SHORT_STRING: usize = 64;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

// ============================================================================
// Helper for creating heapless strings
// ============================================================================

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    // Stop at the last char boundary that still fits
    let valid_end = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|end| *end <= MAX_SHORT_STRING)
        .last()
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

// ============================================================================
// Time Zone
// ============================================================================

/// One of the six time zones selectable from the settings page.
///
/// The keys match the radio-button widget names on the display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ZoneKey {
    /// Coordinated Universal Time (`ut`).
    #[default]
    Utc,
    /// US Eastern (`et`).
    Eastern,
    /// US Central (`ct`).
    Central,
    /// US Mountain (`mt`).
    Mountain,
    /// US Pacific (`pt`).
    Pacific,
    /// The host's local zone (`lt`).
    Local,
}

/// Error for a zone key outside the selectable set.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown time zone key: {0:?}")]
pub struct UnknownZone(pub String);

/// A wall-clock reading in the configured zone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalTime {
    /// Time of day.
    pub time: NaiveTime,
    /// Fully formatted clock face text, e.g. `Monday March 04, 2024 02:05 PM CST`.
    pub label: String,
}

/// Clock face format.
const CLOCK_FORMAT: &str = "%A %B %d, %Y %I:%M %p %Z";

impl ZoneKey {
    /// All keys in settings-page order.
    pub const ALL: [ZoneKey; 6] = [
        ZoneKey::Utc,
        ZoneKey::Eastern,
        ZoneKey::Central,
        ZoneKey::Mountain,
        ZoneKey::Pacific,
        ZoneKey::Local,
    ];

    /// Two-letter key used on the wire and as the widget name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ZoneKey::Utc => "ut",
            ZoneKey::Eastern => "et",
            ZoneKey::Central => "ct",
            ZoneKey::Mountain => "mt",
            ZoneKey::Pacific => "pt",
            ZoneKey::Local => "lt",
        }
    }

    /// IANA zone for the key, or `None` for the host's local zone.
    pub fn tz(&self) -> Option<Tz> {
        match self {
            ZoneKey::Utc => Some(chrono_tz::UTC),
            ZoneKey::Eastern => Some(chrono_tz::America::New_York),
            ZoneKey::Central => Some(chrono_tz::America::Chicago),
            ZoneKey::Mountain => Some(chrono_tz::America::Denver),
            ZoneKey::Pacific => Some(chrono_tz::America::Los_Angeles),
            ZoneKey::Local => None,
        }
    }

    /// Convert a UTC instant into this zone.
    pub fn localize(&self, utc: DateTime<Utc>) -> LocalTime {
        self.format(utc, CLOCK_FORMAT)
    }

    /// Convert a UTC instant into this zone using a custom `strftime` format.
    pub fn format(&self, utc: DateTime<Utc>, fmt: &str) -> LocalTime {
        match self.tz() {
            Some(tz) => {
                let t = utc.with_timezone(&tz);
                LocalTime {
                    time: t.time(),
                    label: t.format(fmt).to_string(),
                }
            }
            None => {
                let t = utc.with_timezone(&Local);
                LocalTime {
                    time: t.time(),
                    label: t.format(fmt).to_string(),
                }
            }
        }
    }
}

impl fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZoneKey {
    type Err = UnknownZone;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ZoneKey::ALL
            .into_iter()
            .find(|z| z.as_str() == s.trim())
            .ok_or_else(|| UnknownZone(s.to_string()))
    }
}

impl TryFrom<String> for ZoneKey {
    type Error = UnknownZone;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ZoneKey> for String {
    fn from(z: ZoneKey) -> Self {
        z.as_str().to_string()
    }
}

// ============================================================================
// Speed Unit
// ============================================================================

/// Unit used for wind speed and gust.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedUnit {
    /// Knots, as reported.
    #[default]
    Knots,
    /// Statute miles per hour.
    Mph,
}

impl SpeedUnit {
    /// The other unit.
    pub const fn toggled(self) -> Self {
        match self {
            SpeedUnit::Knots => SpeedUnit::Mph,
            SpeedUnit::Mph => SpeedUnit::Knots,
        }
    }

    /// Label shown on the settings page.
    pub const fn label(&self) -> &'static str {
        match self {
            SpeedUnit::Knots => "KT",
            SpeedUnit::Mph => "MPH",
        }
    }
}

// ============================================================================
// Time of Day
// ============================================================================

/// An `hour:minute` window boundary.
///
/// Stored unvalidated; [`crate::day_window::evaluate`] rejects values
/// outside `0:00..=24:00`. Serialized as `"H:MM"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    /// Hour, `0..=24`.
    pub hour: u8,
    /// Minute, `0..=59`.
    pub minute: u8,
}

/// Error parsing an `H:MM` string.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("expected H:MM, got {0:?}")]
pub struct TimeOfDayParseError(pub String);

impl TimeOfDay {
    /// Creates a boundary. No range check is applied.
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    /// Minutes since midnight.
    pub const fn minute_of_day(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeOfDayParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TimeOfDayParseError(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(err)?;
        let hour = h.trim().parse().map_err(|_| err())?;
        let minute = m.trim().parse().map_err(|_| err())?;
        Ok(Self { hour, minute })
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeOfDayParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

// ============================================================================
// WiFi Credentials
// ============================================================================

/// WiFi network credentials
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiCredentials {
    /// Network SSID
    pub ssid: ShortString,
    /// Network password
    pub password: ShortString,
}

impl WifiCredentials {
    /// Create credentials from string slices
    pub fn new(ssid: &str, password: &str) -> Self {
        Self {
            ssid: short_string(ssid),
            password: short_string(password),
        }
    }
}

// ============================================================================
// Display Config
// ============================================================================

/// Default station when no configuration has been saved.
pub const DEFAULT_STATION: &str = "KLWC";

/// Operator-editable configuration, persisted after every change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// ICAO station identifier, uppercase
    pub station: ShortString,
    /// Zone used for the clock face and the brightness schedule
    pub zone: ZoneKey,
    /// Wind speed unit
    pub speed_unit: SpeedUnit,
    /// Time the display switches to the bright level
    pub bright_start: TimeOfDay,
    /// Time the display switches to the dim level
    pub dim_start: TimeOfDay,
    /// Backlight level while bright (display accepts 0-100)
    pub bright_level: u16,
    /// Backlight level while dim (display accepts 0-100)
    pub dim_level: u16,
    /// WiFi network to join
    pub wifi: WifiCredentials,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            station: short_string(DEFAULT_STATION),
            zone: ZoneKey::Utc,
            speed_unit: SpeedUnit::Knots,
            bright_start: TimeOfDay::new(7, 0),
            dim_start: TimeOfDay::new(21, 0),
            bright_level: 100,
            dim_level: 10,
            wifi: WifiCredentials::default(),
        }
    }
}

impl DisplayConfig {
    /// Set the station (uppercased)
    pub fn with_station(mut self, station: &str) -> Self {
        self.station = short_string(&station.to_uppercase());
        self
    }

    /// Set the time zone
    pub fn with_zone(mut self, zone: ZoneKey) -> Self {
        self.zone = zone;
        self
    }

    /// Set the wind speed unit
    pub fn with_speed_unit(mut self, unit: SpeedUnit) -> Self {
        self.speed_unit = unit;
        self
    }

    /// Set the bright window start
    pub fn with_bright_start(mut self, at: TimeOfDay) -> Self {
        self.bright_start = at;
        self
    }

    /// Set the dim window start
    pub fn with_dim_start(mut self, at: TimeOfDay) -> Self {
        self.dim_start = at;
        self
    }

    /// Set both brightness levels
    pub fn with_levels(mut self, bright: u16, dim: u16) -> Self {
        self.bright_level = bright;
        self.dim_level = dim;
        self
    }

    /// Set WiFi credentials
    pub fn with_wifi(mut self, wifi: WifiCredentials) -> Self {
        self.wifi = wifi;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // =========================================================================
    // short_string Tests
    // =========================================================================

    #[test]
    fn short_string_keeps_short_input() {
        assert_eq!(short_string("KLWC").as_str(), "KLWC");
    }

    #[test]
    fn short_string_truncates_on_char_boundary() {
        let long = "é".repeat(40); // 80 bytes
        let s = short_string(&long);
        assert_eq!(s.len(), 64);
        assert!(s.chars().all(|c| c == 'é'));
    }

    // =========================================================================
    // ZoneKey Tests
    // =========================================================================

    #[test]
    fn zone_key_round_trips_through_text() {
        for zone in ZoneKey::ALL {
            assert_eq!(zone.as_str().parse::<ZoneKey>().unwrap(), zone);
        }
    }

    #[test]
    fn zone_key_rejects_unknown() {
        assert_eq!(
            "zz".parse::<ZoneKey>(),
            Err(UnknownZone("zz".to_string()))
        );
    }

    #[test]
    fn zone_key_localizes_central() {
        let utc = Utc.with_ymd_and_hms(2024, 1, 15, 18, 30, 0).unwrap();
        let local = ZoneKey::Central.localize(utc);
        assert_eq!(local.time, NaiveTime::from_hms_opt(12, 30, 0).unwrap());
        assert_eq!(local.label, "Monday January 15, 2024 12:30 PM CST");
    }

    #[test]
    fn zone_key_utc_label() {
        let utc = Utc.with_ymd_and_hms(2024, 7, 4, 3, 5, 0).unwrap();
        assert_eq!(
            ZoneKey::Utc.localize(utc).label,
            "Thursday July 04, 2024 03:05 AM UTC"
        );
    }

    // =========================================================================
    // TimeOfDay Tests
    // =========================================================================

    #[test]
    fn time_of_day_display_pads_minutes() {
        assert_eq!(TimeOfDay::new(7, 5).to_string(), "7:05");
        assert_eq!(TimeOfDay::new(22, 30).to_string(), "22:30");
    }

    #[test]
    fn time_of_day_parse() {
        assert_eq!("8:00".parse::<TimeOfDay>().unwrap(), TimeOfDay::new(8, 0));
        assert_eq!(" 30:70 ".parse::<TimeOfDay>().unwrap(), TimeOfDay::new(30, 70));
        assert!("800".parse::<TimeOfDay>().is_err());
        assert!("a:00".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn time_of_day_minute_of_day() {
        assert_eq!(TimeOfDay::new(0, 0).minute_of_day(), 0);
        assert_eq!(TimeOfDay::new(24, 0).minute_of_day(), 1440);
        assert_eq!(TimeOfDay::new(6, 15).minute_of_day(), 375);
    }

    // =========================================================================
    // DisplayConfig Tests
    // =========================================================================

    #[test]
    fn display_config_defaults() {
        let config = DisplayConfig::default();
        assert_eq!(config.station.as_str(), "KLWC");
        assert_eq!(config.zone, ZoneKey::Utc);
        assert_eq!(config.speed_unit, SpeedUnit::Knots);
        assert_eq!(config.bright_level, 100);
        assert_eq!(config.dim_level, 10);
    }

    #[test]
    fn display_config_toml_round_trip() {
        let config = DisplayConfig::default()
            .with_station("kord")
            .with_zone(ZoneKey::Pacific)
            .with_speed_unit(SpeedUnit::Mph)
            .with_dim_start(TimeOfDay::new(22, 15))
            .with_wifi(WifiCredentials::new("hangar", "secret"));

        let text = toml::to_string(&config).unwrap();
        assert!(text.contains("zone = \"pt\""));
        assert!(text.contains("dim_start = \"22:15\""));

        let back: DisplayConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn display_config_partial_toml_uses_defaults() {
        let config: DisplayConfig = toml::from_str("station = \"KSEA\"\n").unwrap();
        assert_eq!(config.station.as_str(), "KSEA");
        assert_eq!(config.dim_level, 10);
    }

    #[test]
    fn speed_unit_toggles() {
        assert_eq!(SpeedUnit::Knots.toggled(), SpeedUnit::Mph);
        assert_eq!(SpeedUnit::Mph.toggled(), SpeedUnit::Knots);
        assert_eq!(SpeedUnit::Mph.label(), "MPH");
    }
}
