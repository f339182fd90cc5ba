//! Technician and absence models.
//!
//! Technicians are the lanes of the planning board: each one carries a
//! daily AW capacity, shift bounds, and a set of skill tags used by the
//! validator's skill-gap check. Absences subtract from capacity and block
//! assignment; they never own appointments.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::aw::{self, DEFAULT_DAILY_CAPACITY_AW, WORKING_END_HOUR, WORKING_START_HOUR};

/// A technician who can be assigned appointments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Technician {
    /// Unique technician identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Shift start (time of day).
    pub shift_start: NaiveTime,
    /// Shift end (time of day).
    pub shift_end: NaiveTime,
    /// Work units available per working day. `None` = workshop default.
    pub aw_capacity_per_day: Option<i64>,
    /// Whether the technician appears on the board.
    pub active: bool,
    /// Skill tags (e.g. "engine", "bodywork", "diagnostics").
    pub skills: Vec<String>,
}

impl Technician {
    /// Creates an active technician with default shift and capacity.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            shift_start: NaiveTime::from_hms_opt(WORKING_START_HOUR, 0, 0)
                .expect("valid shift start constant"),
            shift_end: NaiveTime::from_hms_opt(WORKING_END_HOUR, 0, 0)
                .expect("valid shift end constant"),
            aw_capacity_per_day: None,
            active: true,
            skills: Vec::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets shift bounds.
    pub fn with_shift(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.shift_start = start;
        self.shift_end = end;
        self
    }

    /// Sets the daily AW capacity (clamped at zero).
    pub fn with_capacity(mut self, aw_per_day: i64) -> Self {
        self.aw_capacity_per_day = Some(aw_per_day.max(0));
        self
    }

    /// Adds a skill tag.
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.push(skill.into());
        self
    }

    /// Replaces the skill tags.
    pub fn with_skills(mut self, skills: Vec<String>) -> Self {
        self.skills = skills;
        self
    }

    /// Sets the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Daily AW capacity, falling back to the workshop default.
    pub fn daily_capacity_aw(&self) -> i64 {
        self.aw_capacity_per_day
            .unwrap_or(DEFAULT_DAILY_CAPACITY_AW)
            .max(0)
    }

    /// Whether the technician covers a required skill.
    ///
    /// A skill counts as covered when any of the technician's tags
    /// contains the required skill as a case-insensitive substring, so
    /// "engine diagnostics" covers a requirement of "engine".
    pub fn has_skill(&self, required: &str) -> bool {
        let needle = required.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.skills
            .iter()
            .any(|tag| tag.to_lowercase().contains(&needle))
    }
}

/// Splits a legacy free-text specialization field into skill tags.
///
/// The historical technician records keep skills as one comma-separated
/// string ("engine, bodywork, A/C"). This is the single place that
/// vocabulary is normalized; everything downstream works on tag lists.
pub fn skills_from_specialization(specialization: &str) -> Vec<String> {
    specialization
        .split(", ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// A technician absence, either full-day or a partial time-of-day range.
///
/// Used only for conflict checking and capacity deduction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicianAbsence {
    /// Absent technician.
    pub technician_id: String,
    /// Calendar day of the absence.
    pub date: NaiveDate,
    /// Partial-day start (time of day). `None` = full day.
    pub from_time: Option<NaiveTime>,
    /// Partial-day end (time of day). `None` = full day.
    pub to_time: Option<NaiveTime>,
}

impl TechnicianAbsence {
    /// Creates a full-day absence.
    pub fn full_day(technician_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            technician_id: technician_id.into(),
            date,
            from_time: None,
            to_time: None,
        }
    }

    /// Creates a partial-day absence.
    pub fn partial(
        technician_id: impl Into<String>,
        date: NaiveDate,
        from_time: NaiveTime,
        to_time: NaiveTime,
    ) -> Self {
        Self {
            technician_id: technician_id.into(),
            date,
            from_time: Some(from_time),
            to_time: Some(to_time),
        }
    }

    /// Whether this absence covers the whole working day.
    ///
    /// An absence missing either bound counts as full-day.
    pub fn is_full_day(&self) -> bool {
        self.from_time.is_none() || self.to_time.is_none()
    }

    /// AW consumed by a partial-day absence (0 for malformed ranges).
    ///
    /// Full-day absences are handled by the capacity calculator, which
    /// short-circuits to the whole daily capacity.
    pub fn duration_aw(&self) -> i64 {
        match (self.from_time, self.to_time) {
            (Some(from), Some(to)) => aw::minutes_to_aw((to - from).num_minutes()).max(0),
            _ => 0,
        }
    }

    /// Whether the absence blocks a proposed time-of-day range.
    ///
    /// Full-day absences block everything; partial ones use half-open
    /// overlap on times of day (dates are not compared here — callers
    /// pass absences already filtered to the relevant day).
    pub fn blocks(&self, start: NaiveTime, end: NaiveTime) -> bool {
        match (self.from_time, self.to_time) {
            (Some(from), Some(to)) => aw::time_ranges_overlap(from, to, start, end),
            _ => true,
        }
    }
}
