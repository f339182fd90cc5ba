//! Appointment model and status vocabulary.
//!
//! An appointment is one job card on the planning board: a customer's
//! vehicle, an AW estimate, and whatever flags intake attached. Its
//! status and the existence of a live [`crate::models::ScheduleAssignment`]
//! must stay consistent; the lifecycle manager enforces that pairing.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Flag set when the vehicle is already on the premises.
pub const FLAG_VEHICLE_ONSITE: &str = "vehicle_onsite";

/// Flag set while required parts are still on order.
pub const FLAG_PARTS_ORDERED: &str = "parts_ordered";

/// Appointment urgency, as picked at intake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

/// Appointment status on the planning board.
///
/// One closed vocabulary for the whole crate. Legacy records still carry
/// `new`, `pending`, or `done`; [`AppointmentStatus::normalize`] is the
/// single boundary where those are mapped in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// In the inbox, no technician assigned.
    #[default]
    Waiting,
    /// Dropped on a technician lane; a live assignment exists.
    Assigned,
    /// Work has started.
    InProgress,
    /// Interrupted; resumable.
    Paused,
    /// Blocked until ordered parts arrive.
    WaitingParts,
    /// Work finished (terminal).
    Completed,
    /// Vehicle handed back to the customer (terminal).
    Delivered,
    /// Called off (terminal, independent of the happy path).
    Cancelled,
}

impl AppointmentStatus {
    /// Parses a raw status string, folding legacy vocabulary into the
    /// canonical set (`new`/`pending` → `Waiting`, `done` → `Completed`).
    pub fn normalize(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "waiting" | "new" | "pending" => Some(Self::Waiting),
            "assigned" => Some(Self::Assigned),
            "in_progress" => Some(Self::InProgress),
            "paused" => Some(Self::Paused),
            "waiting_parts" => Some(Self::WaitingParts),
            "completed" | "done" => Some(Self::Completed),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Paused => "paused",
            Self::WaitingParts => "waiting_parts",
            Self::Completed => "completed",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether this status ends the appointment's life on the board.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Delivered | Self::Cancelled)
    }

    /// Whether an appointment with this status belongs in the inbox.
    pub fn in_inbox(&self) -> bool {
        matches!(self, Self::Waiting)
    }
}

/// A workshop appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    /// Unique appointment identifier.
    pub id: String,
    /// Day the job is planned for.
    pub date: NaiveDate,
    /// Owning customer (read-only context for scheduling).
    pub customer_id: String,
    /// Vehicle being worked on (read-only context for scheduling).
    pub vehicle_id: String,
    /// Optional catalog service reference.
    pub service_id: Option<String>,
    /// Short job title shown on the card.
    pub title: String,
    /// Free-form intake notes.
    pub notes: String,
    /// Estimated effort in AW (always ≥ 1).
    pub aw_estimate: i64,
    /// Urgency.
    pub priority: Priority,
    /// Board status.
    pub status: AppointmentStatus,
    /// Skill tags the job requires.
    pub required_skills: Vec<String>,
    /// Promised completion deadline, when the customer has one.
    pub sla_promised_at: Option<NaiveDateTime>,
    /// Intake flags (see [`FLAG_VEHICLE_ONSITE`], [`FLAG_PARTS_ORDERED`]).
    pub flags: BTreeSet<String>,
}

impl Appointment {
    /// Creates a waiting appointment with a minimum one-AW estimate.
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        customer_id: impl Into<String>,
        vehicle_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            customer_id: customer_id.into(),
            vehicle_id: vehicle_id.into(),
            service_id: None,
            title: String::new(),
            notes: String::new(),
            aw_estimate: 1,
            priority: Priority::Normal,
            status: AppointmentStatus::Waiting,
            required_skills: Vec::new(),
            sla_promised_at: None,
            flags: BTreeSet::new(),
        }
    }

    /// Sets the job title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets intake notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Sets the catalog service reference.
    pub fn with_service(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = Some(service_id.into());
        self
    }

    /// Sets the AW estimate (clamped to a minimum of 1).
    pub fn with_estimate(mut self, aw: i64) -> Self {
        self.aw_estimate = aw.max(1);
        self
    }

    /// Sets the urgency.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the board status.
    pub fn with_status(mut self, status: AppointmentStatus) -> Self {
        self.status = status;
        self
    }

    /// Adds a required skill tag.
    pub fn with_required_skill(mut self, skill: impl Into<String>) -> Self {
        self.required_skills.push(skill.into());
        self
    }

    /// Sets the promised completion deadline.
    pub fn with_sla(mut self, promised_at: NaiveDateTime) -> Self {
        self.sla_promised_at = Some(promised_at);
        self
    }

    /// Adds an intake flag.
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    /// Whether the vehicle is already on the premises.
    pub fn vehicle_onsite(&self) -> bool {
        self.flags.contains(FLAG_VEHICLE_ONSITE)
    }

    /// Whether parts for this job are still on order.
    pub fn parts_ordered(&self) -> bool {
        self.flags.contains(FLAG_PARTS_ORDERED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 12).unwrap()
    }

    #[test]
    fn test_appointment_builder() {
        let appt = Appointment::new("A1", day(), "C1", "V1")
            .with_title("Brake service")
            .with_estimate(15)
            .with_priority(Priority::High)
            .with_required_skill("brakes")
            .with_flag(FLAG_VEHICLE_ONSITE);

        assert_eq!(appt.aw_estimate, 15);
        assert_eq!(appt.status, AppointmentStatus::Waiting);
        assert!(appt.vehicle_onsite());
        assert!(!appt.parts_ordered());
    }

    #[test]
    fn test_estimate_minimum() {
        let appt = Appointment::new("A1", day(), "C1", "V1").with_estimate(0);
        assert_eq!(appt.aw_estimate, 1);

        let negative = Appointment::new("A2", day(), "C1", "V1").with_estimate(-3);
        assert_eq!(negative.aw_estimate, 1);
    }

    #[test]
    fn test_status_normalization() {
        assert_eq!(
            AppointmentStatus::normalize("new"),
            Some(AppointmentStatus::Waiting)
        );
        assert_eq!(
            AppointmentStatus::normalize("pending"),
            Some(AppointmentStatus::Waiting)
        );
        assert_eq!(
            AppointmentStatus::normalize("done"),
            Some(AppointmentStatus::Completed)
        );
        assert_eq!(
            AppointmentStatus::normalize(" In_Progress "),
            Some(AppointmentStatus::InProgress)
        );
        assert_eq!(AppointmentStatus::normalize("archived"), None);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            AppointmentStatus::Waiting,
            AppointmentStatus::Assigned,
            AppointmentStatus::InProgress,
            AppointmentStatus::Paused,
            AppointmentStatus::WaitingParts,
            AppointmentStatus::Completed,
            AppointmentStatus::Delivered,
            AppointmentStatus::Cancelled,
        ] {
            assert_eq!(AppointmentStatus::normalize(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_terminal_and_inbox() {
        assert!(AppointmentStatus::Completed.is_terminal());
        assert!(AppointmentStatus::Delivered.is_terminal());
        assert!(AppointmentStatus::Cancelled.is_terminal());
        assert!(!AppointmentStatus::Paused.is_terminal());

        assert!(AppointmentStatus::Waiting.in_inbox());
        assert!(!AppointmentStatus::Assigned.in_inbox());
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Urgent > Priority::High);
        assert!(Priority::High > Priority::Normal);
        assert!(Priority::Normal > Priority::Low);
        assert_eq!(Priority::default(), Priority::Normal);
    }

    #[test]
    fn test_serde_snake_case_status() {
        let json = serde_json::to_string(&AppointmentStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
