//! AW work-unit time model.
//!
//! The workshop plans labor in AW work units: 1 AW = 6 minutes, so 10 AW
//! make an hour. Everything the planning board displays — capacity bars,
//! slot widths, utilization — goes through these conversions.
//!
//! All functions here are pure and total; there are no error paths. The
//! only division is guarded at the call site in [`crate::capacity`].
//!
//! # Interval Semantics
//! Time ranges are half-open `[start, end)`: touching endpoints do not
//! overlap, so a job ending at 10:00 and one starting at 10:00 can share
//! a technician.

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// One AW equals six minutes of labor.
pub const MINUTES_PER_AW: i64 = 6;

/// Daily capacity assumed when a technician record omits one.
pub const DEFAULT_DAILY_CAPACITY_AW: i64 = 80;

/// Planning-board slot granularity in minutes.
pub const DEFAULT_GRID_MINUTES: u32 = 15;

/// Default start of the working day (hour of day).
pub const WORKING_START_HOUR: u32 = 7;

/// Default end of the working day (hour of day, exclusive).
pub const WORKING_END_HOUR: u32 = 18;

/// Converts AW to minutes.
#[inline]
pub fn aw_to_minutes(aw: i64) -> i64 {
    aw * MINUTES_PER_AW
}

/// Converts minutes to AW, rounding half up to the nearest unit.
#[inline]
pub fn minutes_to_aw(minutes: i64) -> i64 {
    div_round_half_up(minutes, MINUTES_PER_AW)
}

/// Converts AW to fractional hours.
#[inline]
pub fn aw_to_hours(aw: i64) -> f64 {
    aw_to_minutes(aw) as f64 / 60.0
}

/// Converts fractional hours to AW (via minutes, rounding half up).
#[inline]
pub fn hours_to_aw(hours: f64) -> i64 {
    minutes_to_aw((hours * 60.0).round() as i64)
}

/// End time of a job starting at `start` and estimated at `aw` work units.
pub fn calculate_end_time(start: NaiveDateTime, aw: i64) -> NaiveDateTime {
    start + Duration::minutes(aw_to_minutes(aw))
}

/// AW spanned between two timestamps.
///
/// Negative when `end < start`; callers must guard before using the
/// result as a duration.
pub fn calculate_aw(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    minutes_to_aw((end - start).num_minutes())
}

/// Whether two half-open ranges `[s1, e1)` and `[s2, e2)` overlap.
///
/// Touching endpoints (`e1 == s2`) do not overlap. Works for both
/// timestamps and bare times of day.
#[inline]
pub fn time_ranges_overlap<T: PartialOrd>(s1: T, e1: T, s2: T, e2: T) -> bool {
    s1 < e2 && e1 > s2
}

/// Rounds the minute component to the nearest multiple of `grid_minutes`
/// (half up), zeroing seconds and sub-seconds. Carries into the next hour
/// when the minute rounds to 60.
pub fn snap_to_grid(at: NaiveDateTime, grid_minutes: u32) -> NaiveDateTime {
    let grid = grid_minutes.max(1) as i64;
    let minute = at.minute() as i64;
    let snapped = (minute + grid / 2) / grid * grid;
    truncate_to_minute(at) + Duration::minutes(snapped - minute)
}

/// Rounds up to the next grid boundary. A timestamp already on the
/// boundary (with zero seconds) is returned unchanged.
pub fn ceil_to_grid(at: NaiveDateTime, grid_minutes: u32) -> NaiveDateTime {
    let grid = grid_minutes.max(1) as i64;
    let minute = at.minute() as i64;
    let rem = minute % grid;
    let on_boundary = rem == 0 && at.second() == 0 && at.nanosecond() == 0;
    let delta = if on_boundary { 0 } else { grid - rem };
    truncate_to_minute(at) + Duration::minutes(delta)
}

fn truncate_to_minute(at: NaiveDateTime) -> NaiveDateTime {
    at - Duration::seconds(at.second() as i64) - Duration::nanoseconds(at.nanosecond() as i64)
}

/// Working-day bounds for the planning board.
///
/// The containment check compares the hour component only: a timestamp
/// exactly at the end hour fails, one minute before it passes. This
/// mirrors how the board columns are laid out — whole-hour rows, with
/// the grid handling anything finer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    /// Start of the working day (inclusive).
    pub start: NaiveTime,
    /// End of the working day (exclusive).
    pub end: NaiveTime,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(WORKING_START_HOUR, 0, 0)
                .expect("valid working-hours start constant"),
            end: NaiveTime::from_hms_opt(WORKING_END_HOUR, 0, 0)
                .expect("valid working-hours end constant"),
        }
    }
}

impl WorkingHours {
    /// Creates working-day bounds.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Whether a timestamp falls inside the working day.
    ///
    /// Hour-component check only: `[start_hour, end_hour)`.
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        let hour = at.hour();
        hour >= self.start.hour() && hour < self.end.hour()
    }

    /// Slot start times across the working day at the given granularity.
    ///
    /// The sequence starts at the opening time and stops before the
    /// closing time.
    pub fn time_slots(&self, grid_minutes: u32) -> Vec<NaiveTime> {
        let step = Duration::minutes(grid_minutes.max(1) as i64);
        let mut slots = Vec::new();
        let mut current = self.start;
        while current < self.end {
            slots.push(current);
            let (next, wrapped) = current.overflowing_add_signed(step);
            if wrapped != 0 {
                break;
            }
            current = next;
        }
        slots
    }
}

/// Whether a timestamp falls inside the default 07:00–18:00 working day.
pub fn is_within_working_hours(at: NaiveDateTime) -> bool {
    WorkingHours::default().contains(at)
}

/// Integer division rounding half away from zero toward positive infinity
/// for non-negative dividends; negative dividends mirror through negation.
fn div_round_half_up(value: i64, divisor: i64) -> i64 {
    if value >= 0 {
        (2 * value + divisor) / (2 * divisor)
    } else {
        -((2 * -value + divisor) / (2 * divisor))
    }
}
