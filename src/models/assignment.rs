//! Schedule assignment model.
//!
//! A schedule assignment pins an appointment to a technician lane for a
//! concrete time range. At most one live assignment exists per appointment;
//! that rule is enforced by the lifecycle manager (delete before create),
//! not by a database constraint.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::aw;

/// Status of a schedule assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Planned on the board, not started.
    #[default]
    Scheduled,
    /// Technician is working the job.
    InProgress,
    /// Work finished.
    Completed,
    /// Withdrawn; ignored by conflict checks.
    Cancelled,
}

/// An appointment-technician-time assignment on the planning board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleAssignment {
    /// Unique assignment identifier.
    pub id: String,
    /// Assigned appointment.
    pub appointment_id: String,
    /// Owning technician lane.
    pub technician_id: String,
    /// Start timestamp (inclusive).
    pub start_time: NaiveDateTime,
    /// End timestamp (exclusive). Always after `start_time`.
    pub end_time: NaiveDateTime,
    /// Planned effort in AW. Derived from the time range by default but a
    /// manual override is tolerated.
    pub aw_planned: i64,
    /// Assignment status.
    pub status: AssignmentStatus,
}

impl ScheduleAssignment {
    /// Creates a scheduled assignment, deriving `aw_planned` from the
    /// time range (6 minutes per AW).
    pub fn new(
        id: impl Into<String>,
        appointment_id: impl Into<String>,
        technician_id: impl Into<String>,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            appointment_id: appointment_id.into(),
            technician_id: technician_id.into(),
            start_time,
            end_time,
            aw_planned: aw::calculate_aw(start_time, end_time).max(0),
            status: AssignmentStatus::Scheduled,
        }
    }

    /// Overrides the planned AW (manual adjustment from the board).
    pub fn with_planned_aw(mut self, aw_planned: i64) -> Self {
        self.aw_planned = aw_planned;
        self
    }

    /// Sets the assignment status.
    pub fn with_status(mut self, status: AssignmentStatus) -> Self {
        self.status = status;
        self
    }

    /// Duration in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// Whether this assignment still occupies its lane.
    pub fn is_live(&self) -> bool {
        self.status != AssignmentStatus::Cancelled
    }

    /// Whether the time ranges of two assignments overlap (half-open).
    pub fn overlaps(&self, other: &Self) -> bool {
        aw::time_ranges_overlap(
            self.start_time,
            self.end_time,
            other.start_time,
            other.end_time,
        )
    }
}
