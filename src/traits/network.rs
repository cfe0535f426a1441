//! Network abstraction traits for observation fetches and WiFi management.
//!
//! # Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`MetarSource`] | Fetch the latest observation for a station |
//! | [`NetworkManager`] | Report reachability and swap WiFi credentials |
//!
//! Both are blocking. The scheduler is single-threaded, so a fetch holds
//! the loop for at most the source's own timeout (about 10 s on Linux).

use std::net::IpAddr;

use thiserror::Error;

use crate::config::WifiCredentials;
use crate::observation::Observation;

// ============================================================================
// Observation Source
// ============================================================================

/// Why an observation could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection failed, timed out, or returned an unexpected status.
    #[error("weather service unreachable: {0}")]
    Unreachable(String),

    /// The service refused the request (HTTP 403).
    #[error("weather service refused the request")]
    Forbidden,

    /// A response arrived but did not contain a usable observation.
    #[error("malformed observation: {0}")]
    Malformed(String),
}

/// Source of METAR observations.
///
/// # Example
///
/// ```rust,ignore
/// use metar_clock::traits::{MetarSource, FetchError};
/// use metar_clock::Observation;
///
/// struct Canned(String);
///
/// impl MetarSource for Canned {
///     fn fetch(&mut self, _station: &str) -> Result<Observation, FetchError> {
///         Observation::from_json(&self.0)
///     }
/// }
/// ```
pub trait MetarSource {
    /// Fetch the most recent observation for `station` (e.g. `"KLWC"`).
    fn fetch(&mut self, station: &str) -> Result<Observation, FetchError>;
}

// ============================================================================
// Network Manager
// ============================================================================

/// Failure reconfiguring the host network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// The network tool could not be run or exited unsuccessfully.
    #[error("network command failed: {0}")]
    Command(String),
}

/// Host network reachability and WiFi profile management.
///
/// # Implementation Notes
///
/// - `address` is polled every housekeeping pass and must be cheap
/// - `connect` and `forget` are best-effort; the scheduler only logs failures
pub trait NetworkManager {
    /// Current address of the managed interface, or `None` when offline.
    fn address(&mut self) -> Option<IpAddr>;

    /// Join a network using new credentials.
    fn connect(&mut self, credentials: &WifiCredentials) -> Result<(), NetworkError>;

    /// Remove the saved connection profile for `ssid`.
    fn forget(&mut self, ssid: &str) -> Result<(), NetworkError>;

    /// Returns true if the interface currently has an address.
    fn is_online(&mut self) -> bool {
        self.address().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_messages() {
        assert_eq!(
            FetchError::Forbidden.to_string(),
            "weather service refused the request"
        );
        assert!(FetchError::Unreachable("timed out".into())
            .to_string()
            .ends_with("timed out"));
        assert!(FetchError::Malformed("empty".into())
            .to_string()
            .starts_with("malformed"));
    }

    struct Fixed(Option<IpAddr>);

    impl NetworkManager for Fixed {
        fn address(&mut self) -> Option<IpAddr> {
            self.0
        }

        fn connect(&mut self, _credentials: &WifiCredentials) -> Result<(), NetworkError> {
            Ok(())
        }

        fn forget(&mut self, _ssid: &str) -> Result<(), NetworkError> {
            Err(NetworkError::Command("no profile".into()))
        }
    }

    #[test]
    fn is_online_follows_address() {
        let mut offline = Fixed(None);
        assert!(!offline.is_online());

        let mut online = Fixed(Some("10.0.0.7".parse().unwrap()));
        assert!(online.is_online());
    }
}
