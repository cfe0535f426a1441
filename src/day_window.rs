//! Bright/dim decision from time of day.
//!
//! Two configured boundaries split the day. Whichever comes first starts
//! its own window, which runs until the other boundary:
//!
//! ```text
//! bright 08:00, dim 20:00      bright 22:00, dim 06:00
//! 00 ── dim ── 08 ── bright ── 20 ── dim ── 24
//! 00 ── bright ── 06 ── dim ── 22 ── bright ── 24
//! ```
//!
//! Comparison is at minute resolution. Seconds are ignored.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveTime;
//! use metar_clock::config::TimeOfDay;
//! use metar_clock::day_window::{evaluate, Brightness};
//!
//! let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
//! let (bright, dim) = (TimeOfDay::new(22, 0), TimeOfDay::new(6, 0));
//!
//! assert_eq!(evaluate(at(23, 0), bright, dim), Ok(Brightness::Bright));
//! assert_eq!(evaluate(at(5, 0), bright, dim), Ok(Brightness::Dim));
//! ```

use chrono::{NaiveTime, Timelike};
use thiserror::Error;

use crate::config::TimeOfDay;

/// Backlight state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Brightness {
    /// Use the bright level.
    Bright,
    /// Use the dim level.
    Dim,
}

/// A window boundary outside `0:00..=24:00`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("window boundary {0} is out of range")]
pub struct WindowError(pub TimeOfDay);

/// Last valid minute-of-day for a boundary (24:00).
const END_OF_DAY: u16 = 24 * 60;

fn boundary_minute(t: TimeOfDay) -> Result<u16, WindowError> {
    if t.minute > 59 || t.minute_of_day() > END_OF_DAY {
        return Err(WindowError(t));
    }
    Ok(t.minute_of_day())
}

/// Decide the backlight state at `now`.
///
/// Equal boundaries mean there is no dim window: the result is always
/// [`Brightness::Bright`].
///
/// # Errors
///
/// [`WindowError`] if either boundary has minute > 59 or lies past 24:00.
pub fn evaluate(
    now: NaiveTime,
    bright_start: TimeOfDay,
    dim_start: TimeOfDay,
) -> Result<Brightness, WindowError> {
    let bright = boundary_minute(bright_start)?;
    let dim = boundary_minute(dim_start)?;
    let now = (now.hour() * 60 + now.minute()) as u16;

    let state = if dim > bright {
        if (bright..dim).contains(&now) {
            Brightness::Bright
        } else {
            Brightness::Dim
        }
    } else if dim < bright {
        if (dim..bright).contains(&now) {
            Brightness::Dim
        } else {
            Brightness::Bright
        }
    } else {
        Brightness::Bright
    };
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn tod(h: u8, m: u8) -> TimeOfDay {
        TimeOfDay::new(h, m)
    }

    // =========================================================================
    // Daytime bright window
    // =========================================================================

    #[test]
    fn bright_during_day() {
        let (b, d) = (tod(8, 0), tod(20, 0));
        assert_eq!(evaluate(at(9, 0), b, d), Ok(Brightness::Bright));
        assert_eq!(evaluate(at(21, 0), b, d), Ok(Brightness::Dim));
    }

    #[test]
    fn bright_during_day_boundaries() {
        let (b, d) = (tod(8, 0), tod(20, 0));
        assert_eq!(evaluate(at(8, 0), b, d), Ok(Brightness::Bright));
        assert_eq!(evaluate(at(20, 0), b, d), Ok(Brightness::Dim));
        assert_eq!(evaluate(at(7, 59), b, d), Ok(Brightness::Dim));
        assert_eq!(evaluate(at(19, 59), b, d), Ok(Brightness::Bright));
    }

    #[test]
    fn seconds_are_ignored() {
        let (b, d) = (tod(8, 0), tod(20, 0));
        let just_before = NaiveTime::from_hms_opt(19, 59, 59).unwrap();
        assert_eq!(evaluate(just_before, b, d), Ok(Brightness::Bright));
    }

    // =========================================================================
    // Bright window across midnight
    // =========================================================================

    #[test]
    fn bright_spans_midnight() {
        let (b, d) = (tod(22, 0), tod(6, 0));
        assert_eq!(evaluate(at(23, 0), b, d), Ok(Brightness::Bright));
        assert_eq!(evaluate(at(5, 0), b, d), Ok(Brightness::Dim));
        assert_eq!(evaluate(at(10, 0), b, d), Ok(Brightness::Bright));
        assert_eq!(evaluate(at(0, 0), b, d), Ok(Brightness::Bright));
    }

    #[test]
    fn bright_spans_midnight_boundaries() {
        let (b, d) = (tod(22, 0), tod(6, 0));
        assert_eq!(evaluate(at(6, 0), b, d), Ok(Brightness::Bright));
        assert_eq!(evaluate(at(22, 0), b, d), Ok(Brightness::Bright));
        assert_eq!(evaluate(at(21, 59), b, d), Ok(Brightness::Dim));
    }

    // =========================================================================
    // Degenerate and invalid boundaries
    // =========================================================================

    #[test]
    fn equal_boundaries_always_bright() {
        let t = tod(7, 30);
        for h in [0, 7, 12, 23] {
            assert_eq!(evaluate(at(h, 30), t, t), Ok(Brightness::Bright));
        }
    }

    #[test]
    fn end_of_day_boundary_accepted() {
        // Bright from 06:00 until midnight
        let (b, d) = (tod(6, 0), tod(24, 0));
        assert_eq!(evaluate(at(23, 59), b, d), Ok(Brightness::Bright));
        assert_eq!(evaluate(at(3, 0), b, d), Ok(Brightness::Dim));
    }

    #[test]
    fn out_of_range_boundaries_rejected() {
        let ok = tod(8, 0);
        assert_eq!(
            evaluate(at(9, 0), tod(25, 0), ok),
            Err(WindowError(tod(25, 0)))
        );
        assert_eq!(
            evaluate(at(9, 0), ok, tod(8, 60)),
            Err(WindowError(tod(8, 60)))
        );
        assert_eq!(
            evaluate(at(9, 0), ok, tod(24, 1)),
            Err(WindowError(tod(24, 1)))
        );
    }
}
