//! Technician-day capacity arithmetic.
//!
//! Computes the numbers the planning board displays per technician lane:
//! AW lost to absences, AW already planned, AW still available, and a
//! utilization percentage. Purely advisory — the validator reads the same
//! inputs to gate scheduling, but nothing here blocks anything.
//!
//! # Rules
//! - A full-day absence consumes the entire daily capacity and
//!   short-circuits any partial-absence summation.
//! - Available AW clamps at zero; the board never shows a negative.
//! - Utilization clamps at 100%; a zero-capacity technician reads 0%.

use serde::{Deserialize, Serialize};

use crate::models::{ScheduleAssignment, Technician, TechnicianAbsence};

/// Capacity summary for one technician on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayCapacity {
    /// Daily capacity in AW.
    pub capacity_aw: i64,
    /// AW lost to absences.
    pub absence_aw: i64,
    /// AW already planned on the lane.
    pub planned_aw: i64,
    /// AW still open for new work.
    pub available_aw: i64,
    /// Planned share of capacity, 0–100.
    pub utilization_pct: f64,
}

/// AW consumed by absences against a daily capacity.
///
/// Any full-day absence dominates: the whole capacity is gone and
/// remaining absences are not summed.
pub fn absence_aw(capacity_aw: i64, absences: &[TechnicianAbsence]) -> i64 {
    if absences.iter().any(TechnicianAbsence::is_full_day) {
        return capacity_aw;
    }
    absences.iter().map(TechnicianAbsence::duration_aw).sum()
}

/// Sum of planned AW across assignments.
pub fn planned_aw(assignments: &[ScheduleAssignment]) -> i64 {
    assignments.iter().map(|a| a.aw_planned).sum()
}

/// Remaining available AW, clamped at zero.
pub fn available_aw(
    capacity_aw: i64,
    absences: &[TechnicianAbsence],
    assignments: &[ScheduleAssignment],
) -> i64 {
    (capacity_aw - absence_aw(capacity_aw, absences) - planned_aw(assignments)).max(0)
}

/// Planned share of capacity as a percentage, clamped at 100.
///
/// Zero (or negative) capacity reads as 0% — a defined edge case, not
/// an error.
pub fn utilization_pct(planned_aw: i64, capacity_aw: i64) -> f64 {
    if capacity_aw <= 0 {
        return 0.0;
    }
    (planned_aw as f64 / capacity_aw as f64 * 100.0).min(100.0)
}

/// Builds the full lane summary for one technician-day.
pub fn day_capacity(
    technician: &Technician,
    absences: &[TechnicianAbsence],
    assignments: &[ScheduleAssignment],
) -> DayCapacity {
    let capacity = technician.daily_capacity_aw();
    let absence = absence_aw(capacity, absences);
    let planned = planned_aw(assignments);
    DayCapacity {
        capacity_aw: capacity,
        absence_aw: absence,
        planned_aw: planned,
        available_aw: (capacity - absence - planned).max(0),
        utilization_pct: utilization_pct(planned, capacity),
    }
}
