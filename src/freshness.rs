//! Observation age tracking.
//!
//! A report is stale once the current time is strictly later than its
//! report time plus one hour. Before any report has been parsed the
//! tracker reports stale.

use chrono::{DateTime, TimeDelta, Utc};

/// Age after which a report is considered stale, in seconds.
pub const STALE_AFTER_SECS: i64 = 60 * 60;

/// Whether the displayed observation is current.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Freshness {
    /// Within the last hour.
    Fresh,
    /// Older than an hour, or nothing parsed yet.
    Stale,
}

/// Remembers the report time of the last good observation.
///
/// # Example
///
/// ```rust
/// use chrono::{TimeDelta, Utc};
/// use metar_clock::freshness::{Freshness, FreshnessTracker};
///
/// let mut tracker = FreshnessTracker::new();
/// let now = Utc::now();
/// assert_eq!(tracker.check(now), Freshness::Stale);
///
/// tracker.record(now - TimeDelta::minutes(30));
/// assert_eq!(tracker.check(now), Freshness::Fresh);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FreshnessTracker {
    last_report: Option<DateTime<Utc>>,
}

impl FreshnessTracker {
    /// Creates a tracker with no report recorded.
    pub const fn new() -> Self {
        Self { last_report: None }
    }

    /// Record the report time of a newly parsed observation.
    pub fn record(&mut self, report_time: DateTime<Utc>) {
        self.last_report = Some(report_time);
    }

    /// Report time of the last recorded observation.
    pub fn last_report(&self) -> Option<DateTime<Utc>> {
        self.last_report
    }

    /// Freshness at `now`.
    pub fn check(&self, now: DateTime<Utc>) -> Freshness {
        match self.last_report {
            Some(at) if now <= at + TimeDelta::seconds(STALE_AFTER_SECS) => Freshness::Fresh,
            _ => Freshness::Stale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn nothing_recorded_is_stale() {
        assert_eq!(FreshnessTracker::new().check(noon()), Freshness::Stale);
    }

    #[test]
    fn thirty_minutes_old_is_fresh() {
        let mut t = FreshnessTracker::new();
        t.record(noon() - TimeDelta::minutes(30));
        assert_eq!(t.check(noon()), Freshness::Fresh);
    }

    #[test]
    fn ninety_minutes_old_is_stale() {
        let mut t = FreshnessTracker::new();
        t.record(noon() - TimeDelta::minutes(90));
        assert_eq!(t.check(noon()), Freshness::Stale);
    }

    #[test]
    fn exactly_one_hour_is_still_fresh() {
        let mut t = FreshnessTracker::new();
        t.record(noon() - TimeDelta::hours(1));
        assert_eq!(t.check(noon()), Freshness::Fresh);
        assert_eq!(t.check(noon() + TimeDelta::seconds(1)), Freshness::Stale);
    }

    #[test]
    fn record_replaces_previous() {
        let mut t = FreshnessTracker::new();
        t.record(noon() - TimeDelta::hours(3));
        t.record(noon());
        assert_eq!(t.last_report(), Some(noon()));
        assert_eq!(t.check(noon()), Freshness::Fresh);
    }
}
