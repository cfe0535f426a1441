//! Display instructions: widget names, colors, and page renderers.
//!
//! Every function here is pure and returns instruction text. Writing it to
//! the link is the [`Panel`](crate::Panel)'s job.
//!
//! # Example
//!
//! ```rust
//! use metar_clock::screen::{self, Color};
//!
//! assert_eq!(screen::set_text("data.temp", "41"), "data.temp.txt=\"41\"");
//! assert_eq!(screen::set_color("data.mtime", Color::Red), "data.mtime.pco=63488");
//! assert_eq!(screen::brightness(80), "dim=80");
//! ```

use crate::config::{DisplayConfig, SpeedUnit, ZoneKey};
use crate::freshness::Freshness;
use crate::observation::{c_to_f, hpa_to_inhg, kt_to_mph, Observation, WindDirection};

// ============================================================================
// Colors
// ============================================================================

/// RGB565 font colors used by the pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum Color {
    /// Report is current.
    Green = 2016,
    /// Normal station text.
    White = 65535,
    /// Stale report or failed fetch.
    Red = 63488,
}

impl Color {
    /// RGB565 value sent to the display.
    pub const fn code(self) -> u16 {
        self as u16
    }
}

// ============================================================================
// Widget names
// ============================================================================

/// Page and widget identifiers on the stock HMI project.
pub mod widget {
    /// Boot page.
    pub const PAGE_SPLASH: &str = "splash";
    /// Main weather page.
    pub const PAGE_DATA: &str = "data";

    /// Address or spinner on the boot page.
    pub const SPLASH_ADDRESS: &str = "splash.ipaddr";

    /// Clock face.
    pub const CLOCK: &str = "data.dtime";
    /// Station id.
    pub const STATION: &str = "data.stat";
    /// Report time.
    pub const REPORT_TIME: &str = "data.mtime";
    /// Wind direction gauge / text.
    pub const WIND_DIR_GAUGE: &str = "data.dir_g";
    /// Wind direction text.
    pub const WIND_DIR: &str = "data.dir";
    /// Wind speed gauge.
    pub const WIND_SPEED_GAUGE: &str = "data.spd_g";
    /// Wind speed text.
    pub const WIND_SPEED: &str = "data.spd";
    /// Gust gauge.
    pub const GUST_GAUGE: &str = "data.gust_g";
    /// Gust text.
    pub const GUST: &str = "data.gust";
    /// Temperature gauge.
    pub const TEMP_GAUGE: &str = "data.temp_g";
    /// Temperature text.
    pub const TEMP: &str = "data.temp";
    /// Dewpoint gauge.
    pub const DEWPOINT_GAUGE: &str = "data.dewp_g";
    /// Dewpoint text.
    pub const DEWPOINT: &str = "data.dewp";
    /// Present weather.
    pub const WEATHER: &str = "data.prcp";
    /// Visibility.
    pub const VISIBILITY: &str = "data.vis";
    /// Altimeter.
    pub const ALTIMETER: &str = "data.alt";
    /// Sky condition.
    pub const SKY: &str = "data.sky";
    /// Warning / error text.
    pub const WARNING: &str = "data.warn";
    /// WiFi connected icon.
    pub const WIFI_ICON: &str = "data.wifi";
    /// WiFi disconnected icon.
    pub const NO_WIFI_ICON: &str = "data.nowifi";
    /// Knots unit icon.
    pub const KNOTS_ICON: &str = "data.kt";
    /// MPH unit icon.
    pub const MPH_ICON: &str = "data.mph";

    /// Address on the settings page.
    pub const SETTINGS_ADDRESS: &str = "settings.ipaddr";
    /// Station entry.
    pub const SETTINGS_STATION: &str = "settings.station";
    /// SSID entry.
    pub const SETTINGS_SSID: &str = "settings.ssid";
    /// Password entry.
    pub const SETTINGS_PASSWORD: &str = "settings.password";
    /// Dim start entry.
    pub const SETTINGS_DIM_ON: &str = "settings.dim_on";
    /// Bright start entry.
    pub const SETTINGS_BRIGHT_ON: &str = "settings.brt_on";
    /// Speed unit label.
    pub const SETTINGS_SPEED_UNIT: &str = "settings.spdunit";
}

/// Startup spinner frames.
pub const SPINNER: [&str; 4] = ["|", "/", "--", "\\\\"];

/// Text shown in place of an address while offline.
pub const OFFLINE: &str = "Offline";

/// Text shown for an unknown value.
pub const UNKNOWN: &str = "NA";

// ============================================================================
// Instruction builders
// ============================================================================

/// `<widget>.txt="<text>"`. Double quotes in `text` become single quotes.
pub fn set_text(widget: &str, text: &str) -> String {
    format!("{widget}.txt=\"{}\"", text.replace('"', "'"))
}

/// `<widget>.val=<value>`.
pub fn set_value(widget: &str, value: i64) -> String {
    format!("{widget}.val={value}")
}

/// `<widget>.pco=<color>`.
pub fn set_color(widget: &str, color: Color) -> String {
    format!("{widget}.pco={}", color.code())
}

/// `<widget>.aph=127` when shown, `0` when hidden.
pub fn set_visible(widget: &str, visible: bool) -> String {
    format!("{widget}.aph={}", if visible { 127 } else { 0 })
}

/// `page <name>`.
pub fn page(name: &str) -> String {
    format!("page {name}")
}

/// `dim=<level>`.
pub fn brightness(level: u16) -> String {
    format!("dim={level}")
}

// ============================================================================
// Renderers
// ============================================================================

/// Speed unit label on the settings page and unit icons on the data page.
pub fn speed_unit(unit: SpeedUnit) -> Vec<String> {
    let mph = unit == SpeedUnit::Mph;
    vec![
        set_text(widget::SETTINGS_SPEED_UNIT, unit.label()),
        set_visible(widget::MPH_ICON, mph),
        set_visible(widget::KNOTS_ICON, !mph),
    ]
}

/// WiFi icons and the settings-page address.
pub fn network_status(online: bool, address: &str) -> Vec<String> {
    if online {
        vec![
            set_visible(widget::NO_WIFI_ICON, false),
            set_visible(widget::WIFI_ICON, true),
            set_text(widget::SETTINGS_ADDRESS, address),
        ]
    } else {
        vec![
            set_visible(widget::WIFI_ICON, false),
            set_visible(widget::NO_WIFI_ICON, true),
            set_text(widget::SETTINGS_ADDRESS, address),
        ]
    }
}

/// Zone radio buttons: the selected key set to 1, the others to 0.
pub fn zone_selection(selected: ZoneKey) -> Vec<String> {
    ZoneKey::ALL
        .iter()
        .map(|z| set_value(&format!("settings.{}", z.as_str()), i64::from(*z == selected)))
        .collect()
}

/// WiFi credential fields on the settings page.
pub fn wifi_fields(config: &DisplayConfig) -> Vec<String> {
    vec![
        set_text(widget::SETTINGS_SSID, &config.wifi.ssid),
        set_text(widget::SETTINGS_PASSWORD, &config.wifi.password),
    ]
}

/// Every settings-page field, as shown at startup.
pub fn settings_page(config: &DisplayConfig, address: &str) -> Vec<String> {
    let mut out = vec![
        set_text(widget::SETTINGS_ADDRESS, address),
        set_text(widget::SETTINGS_STATION, &config.station),
    ];
    out.extend(wifi_fields(config));
    out.push(set_text(widget::SETTINGS_DIM_ON, &config.dim_start.to_string()));
    out.push(set_text(
        widget::SETTINGS_BRIGHT_ON,
        &config.bright_start.to_string(),
    ));
    out.extend(zone_selection(config.zone));
    out
}

/// Clock face text.
pub fn clock(label: &str) -> String {
    set_text(widget::CLOCK, label)
}

/// Report-time color for a freshness state.
pub fn freshness(state: Freshness) -> String {
    let color = match state {
        Freshness::Fresh => Color::Green,
        Freshness::Stale => Color::Red,
    };
    set_color(widget::REPORT_TIME, color)
}

/// Station shown red with the failure text in the warning field.
pub fn fetch_failure(station: &str, reason: &str) -> Vec<String> {
    vec![
        set_color(widget::STATION, Color::Red),
        set_text(widget::STATION, station),
        set_text(widget::WARNING, reason),
    ]
}

fn in_unit(kt: i32, unit: SpeedUnit) -> i32 {
    match unit {
        SpeedUnit::Knots => kt,
        SpeedUnit::Mph => kt_to_mph(kt),
    }
}

/// Gauge needle for a speed: 9° per unit, wrapping at a full turn.
fn speed_gauge(speed: i32) -> i64 {
    (i64::from(speed) * 9).rem_euclid(360)
}

/// Gauge needle for a temperature in °F: 3° per degree, floored at zero.
fn temperature_gauge(f: i32) -> i64 {
    (i64::from(f) * 3).max(0)
}

fn temperature(out: &mut Vec<String>, gauge: &str, text: &str, celsius: Option<f64>) {
    match celsius {
        Some(c) => {
            let f = c_to_f(c);
            out.push(set_value(gauge, temperature_gauge(f)));
            out.push(set_text(text, &f.to_string()));
        }
        None => {
            out.push(set_value(gauge, 0));
            out.push(set_text(text, UNKNOWN));
        }
    }
}

/// Sky layers as `"<base> <cover>, ..."`.
pub fn sky_text(obs: &Observation) -> String {
    obs.sky
        .iter()
        .map(|layer| match layer.base {
            Some(base) => format!("{base} {}", layer.cover),
            None => layer.cover.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Full data page for a freshly fetched observation.
///
/// `station` is the configured station, shown white to mark success.
pub fn observation(
    obs: &Observation,
    station: &str,
    unit: SpeedUnit,
    zone: ZoneKey,
) -> Vec<String> {
    let mut out = Vec::with_capacity(24);

    out.push(set_color(widget::STATION, Color::White));
    out.push(set_color(widget::REPORT_TIME, Color::Green));
    out.push(set_text(
        widget::REPORT_TIME,
        &zone.localize(obs.report_time).label,
    ));

    let (dir_gauge, dir_text) = match &obs.wind_direction {
        Some(WindDirection::Degrees(d)) => (i64::from(*d), d.to_string()),
        Some(WindDirection::Text(t)) => (0, t.clone()),
        None => (0, UNKNOWN.to_string()),
    };
    out.push(set_value(widget::WIND_DIR_GAUGE, dir_gauge));
    out.push(set_text(widget::WIND_DIR, &dir_text));

    let speed = in_unit(obs.wind_speed_kt.unwrap_or(0), unit);
    out.push(set_value(widget::WIND_SPEED_GAUGE, speed_gauge(speed)));
    out.push(set_text(widget::WIND_SPEED, &speed.to_string()));

    let gust = in_unit(obs.wind_gust_kt.unwrap_or(0), unit);
    out.push(set_value(widget::GUST_GAUGE, speed_gauge(gust)));
    out.push(set_text(widget::GUST, &gust.to_string()));

    temperature(&mut out, widget::TEMP_GAUGE, widget::TEMP, obs.temperature_c);
    temperature(
        &mut out,
        widget::DEWPOINT_GAUGE,
        widget::DEWPOINT,
        obs.dewpoint_c,
    );

    out.push(set_text(
        widget::WEATHER,
        obs.weather.as_deref().unwrap_or(""),
    ));
    let vis = obs
        .visibility
        .as_ref()
        .map(|v| format!("{v} mi"))
        .unwrap_or_default();
    out.push(set_text(widget::VISIBILITY, &vis));
    let alt = obs
        .altimeter_hpa
        .map(|hpa| format!("{:.2}", hpa_to_inhg(hpa)))
        .unwrap_or_else(|| UNKNOWN.to_string());
    out.push(set_text(widget::ALTIMETER, &alt));
    out.push(set_text(widget::SKY, &sky_text(obs)));

    out.push(set_text(widget::WARNING, ""));
    out.push(set_text(widget::STATION, station));
    out
}
