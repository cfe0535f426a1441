//! Parsed METAR observation snapshot.
//!
//! The weather service returns a JSON array of records. Only the first
//! record is used. Every weather field is optional: a key that is absent
//! and a key that is `null` both mean "unknown".
//!
//! # Example
//!
//! ```rust
//! use metar_clock::Observation;
//!
//! let json = r#"[{"icaoId":"KLWC","reportTime":"2024-01-15T18:00:00Z",
//!                "wdir":"VRB","wspd":4,"temp":-2.0,"clouds":[]}]"#;
//! let obs = Observation::from_json(json).unwrap();
//! assert_eq!(obs.station, "KLWC");
//! assert_eq!(obs.wind_speed_kt, Some(4));
//! assert!(obs.wind_gust_kt.is_none());
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::traits::FetchError;

/// Wind direction as reported.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WindDirection {
    /// True heading in degrees.
    Degrees(i32),
    /// Non-numeric report such as `"VRB"`.
    Text(String),
}

/// Visibility as reported (`10` or `"10+"`).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Visibility {
    /// Statute miles.
    Miles(f64),
    /// Non-numeric report such as `"10+"`.
    Text(String),
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Miles(m) => write!(f, "{m}"),
            Visibility::Text(t) => f.write_str(t),
        }
    }
}

/// One sky-cover layer.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SkyLayer {
    /// Coverage code (`FEW`, `SCT`, `BKN`, `OVC`, `CLR`, ...).
    pub cover: String,
    /// Layer base in feet AGL, absent for clear skies.
    #[serde(default)]
    pub base: Option<i32>,
}

/// Raw record as returned by the service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetarRecord {
    icao_id: String,
    report_time: String,
    #[serde(default)]
    wdir: Option<WindDirection>,
    #[serde(default)]
    wspd: Option<i32>,
    #[serde(default)]
    wgst: Option<i32>,
    #[serde(default)]
    temp: Option<f64>,
    #[serde(default)]
    dewp: Option<f64>,
    #[serde(default)]
    visib: Option<Visibility>,
    #[serde(default)]
    altim: Option<f64>,
    #[serde(default)]
    wx_string: Option<String>,
    #[serde(default)]
    clouds: Option<Vec<SkyLayer>>,
    #[serde(default)]
    raw_ob: Option<String>,
}

/// Immutable snapshot of one station report.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    /// Reporting station.
    pub station: String,
    /// When the report was issued.
    pub report_time: DateTime<Utc>,
    /// Wind direction.
    pub wind_direction: Option<WindDirection>,
    /// Sustained wind in knots.
    pub wind_speed_kt: Option<i32>,
    /// Gust in knots.
    pub wind_gust_kt: Option<i32>,
    /// Air temperature in °C.
    pub temperature_c: Option<f64>,
    /// Dewpoint in °C.
    pub dewpoint_c: Option<f64>,
    /// Prevailing visibility.
    pub visibility: Option<Visibility>,
    /// Altimeter setting in hPa.
    pub altimeter_hpa: Option<f64>,
    /// Present weather (`-RA BR`).
    pub weather: Option<String>,
    /// Sky layers, lowest first.
    pub sky: Vec<SkyLayer>,
    /// Full report text.
    pub raw: Option<String>,
}

impl Observation {
    /// Parse the service's JSON array response.
    ///
    /// # Errors
    ///
    /// [`FetchError::Malformed`] when the body is not JSON, the array is
    /// empty, or the report time is unreadable.
    pub fn from_json(body: &str) -> Result<Self, FetchError> {
        let records: Vec<MetarRecord> =
            serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
        let record = records
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::Malformed("no observation returned".into()))?;
        Self::from_record(record)
    }

    fn from_record(r: MetarRecord) -> Result<Self, FetchError> {
        Ok(Self {
            report_time: parse_report_time(&r.report_time)?,
            station: r.icao_id,
            wind_direction: r.wdir,
            wind_speed_kt: r.wspd,
            wind_gust_kt: r.wgst,
            temperature_c: r.temp,
            dewpoint_c: r.dewp,
            visibility: r.visib,
            altimeter_hpa: r.altim,
            weather: r.wx_string,
            sky: r.clouds.unwrap_or_default(),
            raw: r.raw_ob,
        })
    }
}

/// Accepts RFC 3339 or `YYYY-MM-DD HH:MM:SS` (taken as UTC).
fn parse_report_time(s: &str) -> Result<DateTime<Utc>, FetchError> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|n| n.and_utc())
        .map_err(|_| FetchError::Malformed(format!("unreadable report time {s:?}")))
}

// ============================================================================
// Unit conversions
// ============================================================================

/// Celsius to whole Fahrenheit, rounded half away from zero.
pub fn c_to_f(c: f64) -> i32 {
    (c * 9.0 / 5.0 + 32.0).round() as i32
}

/// Knots to whole statute miles per hour.
pub fn kt_to_mph(kt: i32) -> i32 {
    (kt as f64 * 1.15078).round() as i32
}

/// Hectopascals to inches of mercury.
pub fn hpa_to_inhg(hpa: f64) -> f64 {
    hpa / 33.864
}
