//! Observation source backed by the aviation weather JSON API.

use std::time::Duration;

use tracing::debug;
use ureq::{Agent, AgentBuilder};

use crate::observation::Observation;
use crate::traits::{FetchError, MetarSource};

/// Default request URL. `{station}` is replaced with the station id.
pub const DEFAULT_METAR_URL: &str =
    "https://aviationweather.gov/api/data/metar?ids={station}&hours=0&format=json";

/// Hard limit on a single fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking HTTP observation source.
///
/// # Example
///
/// ```ignore
/// use metar_clock::hal::{HttpMetarSource, DEFAULT_METAR_URL};
/// use metar_clock::traits::MetarSource;
///
/// let mut source = HttpMetarSource::new(DEFAULT_METAR_URL);
/// let obs = source.fetch("KLWC")?;
/// println!("{} at {}", obs.station, obs.report_time);
/// ```
pub struct HttpMetarSource {
    agent: Agent,
    url_template: String,
}

impl HttpMetarSource {
    /// Source using `url_template`, which must contain `{station}`.
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            agent: AgentBuilder::new().timeout(FETCH_TIMEOUT).build(),
            url_template: url_template.into(),
        }
    }

    /// Request URL for `station`.
    pub fn url_for(&self, station: &str) -> String {
        self.url_template.replace("{station}", station)
    }
}

impl Default for HttpMetarSource {
    fn default() -> Self {
        Self::new(DEFAULT_METAR_URL)
    }
}

impl MetarSource for HttpMetarSource {
    fn fetch(&mut self, station: &str) -> Result<Observation, FetchError> {
        let url = self.url_for(station);
        debug!(%url, "fetching observation");

        let body = match self.agent.get(&url).call() {
            Ok(response) => response
                .into_string()
                .map_err(|e| FetchError::Unreachable(e.to_string()))?,
            Err(ureq::Error::Status(403, _)) => return Err(FetchError::Forbidden),
            Err(ureq::Error::Status(code, _)) => {
                return Err(FetchError::Unreachable(format!("HTTP status {code}")))
            }
            Err(e) => return Err(FetchError::Unreachable(e.to_string())),
        };

        Observation::from_json(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_substitutes_station() {
        let source = HttpMetarSource::default();
        assert_eq!(
            source.url_for("KLWC"),
            "https://aviationweather.gov/api/data/metar?ids=KLWC&hours=0&format=json"
        );
    }
}
