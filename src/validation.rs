//! Pre-commit validation of a candidate assignment.
//!
//! Given a proposed (appointment, technician, start, end) tuple plus the
//! technician's existing assignments and absences, runs every check and
//! collects the findings. Nothing here mutates anything; the verdict is
//! advisory except for the hard error gate the caller applies.
//!
//! Checks, in display order (all run regardless of earlier results):
//! 1. Absence conflict → error
//! 2. Double-booking → error
//! 3. Working-hours bound → error
//! 4. Skill gap → warning
//! 5. SLA risk → warning (the under-2h case additionally blocks)
//! 6. Vehicle not onsite → info
//! 7. Parts on order → warning
//! 8. Capacity overbooking → error at ≥100%, warning from 90%

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::aw::{self, WorkingHours};
use crate::models::{Appointment, ScheduleAssignment, Technician, TechnicianAbsence};

/// Minutes of SLA headroom below which scheduling is considered critical.
const SLA_CRITICAL_MINUTES: i64 = 2 * 60;

/// Minutes of SLA headroom below which an advisory warning is raised.
const SLA_RISK_MINUTES: i64 = 4 * 60;

/// Utilization percentage at which a lane counts as overbooked.
const OVERBOOKED_PCT: f64 = 100.0;

/// Utilization percentage at which a lane counts as near capacity.
const NEAR_CAPACITY_PCT: f64 = 90.0;

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks the schedule action.
    Error,
    /// Allowed, but confirmation is an explicit override.
    Warning,
    /// Advisory only.
    Info,
}

/// What a finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Technician is absent during the proposed range.
    AbsenceConflict,
    /// Proposed range overlaps an existing assignment.
    DoubleBooking,
    /// Proposed start or end is outside working hours.
    OutsideWorkingHours,
    /// Technician lacks one or more required skills.
    SkillGap,
    /// Less than two hours remain to the promised deadline.
    SlaCritical,
    /// Two to four hours remain to the promised deadline.
    SlaAtRisk,
    /// Vehicle has not arrived at the workshop yet.
    VehicleNotOnsite,
    /// Required parts are still on order.
    PartsOnOrder,
    /// Planned work would exceed the lane's daily capacity.
    Overbooked,
    /// Planned work approaches the lane's daily capacity.
    NearCapacity,
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Finding category.
    pub kind: FindingKind,
    /// Severity tag shown to the user.
    pub severity: Severity,
    /// Whether this finding vetoes `is_valid`. True for every error and
    /// for the under-2h SLA warning, which the source system blocked on
    /// despite tagging it a warning.
    pub blocking: bool,
    /// Human-readable description.
    pub message: String,
}

impl Finding {
    fn error(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            blocking: true,
            message: message.into(),
        }
    }

    fn warning(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            blocking: false,
            message: message.into(),
        }
    }

    fn blocking_warning(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            blocking: true,
            ..Self::warning(kind, message)
        }
    }

    fn info(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Info,
            blocking: false,
            message: message.into(),
        }
    }
}

/// How the confirm control should present itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// No findings worth confirming: plain "Schedule".
    Schedule,
    /// Warnings present: confirmation is an override ("Schedule Anyway").
    ScheduleAnyway,
    /// Errors present: confirm control disabled ("Cannot Schedule").
    CannotSchedule,
}

/// Ordered list of findings for one candidate assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Findings in display order.
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    /// Whether any finding is an error.
    pub fn has_errors(&self) -> bool {
        self.findings
            .iter()
            .any(|f| f.severity == Severity::Error)
    }

    /// Whether any finding is a warning.
    pub fn has_warnings(&self) -> bool {
        self.findings
            .iter()
            .any(|f| f.severity == Severity::Warning)
    }

    /// Whether no finding blocks the action.
    ///
    /// Stricter than the [`Verdict`] gate: the under-2h SLA warning
    /// makes this false while `verdict()` still allows an override.
    pub fn is_valid(&self) -> bool {
        !self.findings.iter().any(|f| f.blocking)
    }

    /// Gate for the confirm control: errors disable, warnings re-label.
    pub fn verdict(&self) -> Verdict {
        if self.has_errors() {
            Verdict::CannotSchedule
        } else if self.has_warnings() {
            Verdict::ScheduleAnyway
        } else {
            Verdict::Schedule
        }
    }

    fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }
}

/// A proposed assignment awaiting validation.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentCandidate<'a> {
    /// Appointment being placed.
    pub appointment: &'a Appointment,
    /// Target technician lane.
    pub technician: &'a Technician,
    /// Proposed start.
    pub start: NaiveDateTime,
    /// Proposed end.
    pub end: NaiveDateTime,
}

/// Validates a candidate assignment against the technician's day.
///
/// `existing` and `absences` are the technician's assignments and
/// absences for the candidate's day. Live assignments belonging to the
/// candidate's own appointment are ignored — reassignment removes them
/// before the new one is created, so they must not count as conflicts
/// or planned load.
pub fn validate_assignment(
    candidate: &AssignmentCandidate<'_>,
    existing: &[ScheduleAssignment],
    absences: &[TechnicianAbsence],
    working_hours: &WorkingHours,
) -> ValidationReport {
    let mut report = ValidationReport::default();
    let relevant: Vec<&ScheduleAssignment> = existing
        .iter()
        .filter(|a| a.is_live() && a.appointment_id != candidate.appointment.id)
        .collect();

    check_absences(candidate, absences, &mut report);
    check_double_booking(candidate, &relevant, &mut report);
    check_working_hours(candidate, working_hours, &mut report);
    check_skills(candidate, &mut report);
    check_sla(candidate, &mut report);
    check_flags(candidate, &mut report);
    check_capacity(candidate, &relevant, &mut report);

    report
}

/// Check 1: absence conflicts. Comparison is time-of-day only; callers
/// supply absences already filtered to the candidate's day.
fn check_absences(
    candidate: &AssignmentCandidate<'_>,
    absences: &[TechnicianAbsence],
    report: &mut ValidationReport,
) {
    for absence in absences {
        if absence.is_full_day() {
            report.push(Finding::error(
                FindingKind::AbsenceConflict,
                format!("{} is absent all day", display_name(candidate.technician)),
            ));
            return;
        }
        if absence.blocks(candidate.start.time(), candidate.end.time()) {
            report.push(Finding::error(
                FindingKind::AbsenceConflict,
                format!(
                    "{} is absent during the proposed time",
                    display_name(candidate.technician)
                ),
            ));
            return;
        }
    }
}

/// Check 2: double-booking against live assignments on the same lane.
fn check_double_booking(
    candidate: &AssignmentCandidate<'_>,
    existing: &[&ScheduleAssignment],
    report: &mut ValidationReport,
) {
    let clash = existing.iter().any(|a| {
        aw::time_ranges_overlap(candidate.start, candidate.end, a.start_time, a.end_time)
    });
    if clash {
        report.push(Finding::error(
            FindingKind::DoubleBooking,
            "Overlaps an existing assignment on this lane",
        ));
    }
}

/// Check 3: proposed start and end must sit inside working hours.
fn check_working_hours(
    candidate: &AssignmentCandidate<'_>,
    working_hours: &WorkingHours,
    report: &mut ValidationReport,
) {
    if !working_hours.contains(candidate.start) || !working_hours.contains(candidate.end) {
        report.push(Finding::error(
            FindingKind::OutsideWorkingHours,
            format!(
                "Proposed time falls outside working hours ({}–{})",
                working_hours.start.format("%H:%M"),
                working_hours.end.format("%H:%M"),
            ),
        ));
    }
}

/// Check 4: required skills the technician does not cover.
fn check_skills(candidate: &AssignmentCandidate<'_>, report: &mut ValidationReport) {
    let missing: Vec<&str> = candidate
        .appointment
        .required_skills
        .iter()
        .filter(|required| !candidate.technician.has_skill(required))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        report.push(Finding::warning(
            FindingKind::SkillGap,
            format!("Missing skills: {}", missing.join(", ")),
        ));
    }
}

/// Check 5: headroom between the proposed start and the promised deadline.
fn check_sla(candidate: &AssignmentCandidate<'_>, report: &mut ValidationReport) {
    let Some(promised_at) = candidate.appointment.sla_promised_at else {
        return;
    };
    let remaining = (promised_at - candidate.start).num_minutes();
    if remaining < SLA_CRITICAL_MINUTES {
        // Tagged a warning but blocks is_valid, matching the behavior the
        // board was built around.
        report.push(Finding::blocking_warning(
            FindingKind::SlaCritical,
            format!(
                "Less than 2h to the promised deadline ({})",
                promised_at.format("%H:%M")
            ),
        ));
    } else if remaining <= SLA_RISK_MINUTES {
        report.push(Finding::warning(
            FindingKind::SlaAtRisk,
            format!(
                "Under 4h to the promised deadline ({})",
                promised_at.format("%H:%M")
            ),
        ));
    }
}

/// Checks 6 and 7: intake flags.
fn check_flags(candidate: &AssignmentCandidate<'_>, report: &mut ValidationReport) {
    if !candidate.appointment.vehicle_onsite() {
        report.push(Finding::info(
            FindingKind::VehicleNotOnsite,
            "Vehicle has not arrived yet",
        ));
    }
    if candidate.appointment.parts_ordered() {
        report.push(Finding::warning(
            FindingKind::PartsOnOrder,
            "Parts for this job are still on order",
        ));
    }
}

/// Check 8: projected utilization after adding this appointment.
///
/// Exactly 100% counts as overbooked; the warning band is 90% to
/// just under 100%.
fn check_capacity(
    candidate: &AssignmentCandidate<'_>,
    existing: &[&ScheduleAssignment],
    report: &mut ValidationReport,
) {
    let capacity = candidate.technician.daily_capacity_aw();
    let planned: i64 = existing.iter().map(|a| a.aw_planned).sum();
    let projected = planned + candidate.appointment.aw_estimate;

    if capacity <= 0 {
        if projected > 0 {
            report.push(Finding::error(
                FindingKind::Overbooked,
                "Technician has no capacity configured for this day",
            ));
        }
        return;
    }

    let pct = projected as f64 / capacity as f64 * 100.0;
    if pct >= OVERBOOKED_PCT {
        report.push(Finding::error(
            FindingKind::Overbooked,
            format!(
                "Lane would be overbooked: {projected} of {capacity} AW ({pct:.0}%)"
            ),
        ));
    } else if pct >= NEAR_CAPACITY_PCT {
        report.push(Finding::warning(
            FindingKind::NearCapacity,
            format!(
                "Lane near capacity: {projected} of {capacity} AW ({pct:.0}%)"
            ),
        ));
    }
}

fn display_name(technician: &Technician) -> &str {
    if technician.name.is_empty() {
        &technician.id
    } else {
        &technician.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 12).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn dt(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    fn tech() -> Technician {
        Technician::new("T1").with_name("A. Mechanic").with_capacity(80)
    }

    fn appt(aw: i64) -> Appointment {
        Appointment::new("A1", day(), "C1", "V1")
            .with_estimate(aw)
            .with_flag(crate::models::FLAG_VEHICLE_ONSITE)
    }

    fn validate(
        appointment: &Appointment,
        technician: &Technician,
        start: NaiveDateTime,
        end: NaiveDateTime,
        existing: &[ScheduleAssignment],
        absences: &[TechnicianAbsence],
    ) -> ValidationReport {
        let candidate = AssignmentCandidate {
            appointment,
            technician,
            start,
            end,
        };
        validate_assignment(&candidate, existing, absences, &WorkingHours::default())
    }

    fn kinds(report: &ValidationReport) -> Vec<FindingKind> {
        report.findings.iter().map(|f| f.kind).collect()
    }

    #[test]
    fn test_clean_candidate_passes() {
        let a = appt(15);
        let tech = tech();
        let report = validate(&a, &tech, dt(9, 0), dt(10, 30), &[], &[]);
        assert!(report.findings.is_empty());
        assert!(report.is_valid());
        assert_eq!(report.verdict(), Verdict::Schedule);
    }

    #[test]
    fn test_full_day_absence_is_error() {
        let a = appt(10);
        let tech = tech();
        let absences = vec![TechnicianAbsence::full_day("T1", day())];
        let report = validate(&a, &tech, dt(9, 0), dt(10, 0), &[], &absences);
        assert!(kinds(&report).contains(&FindingKind::AbsenceConflict));
        assert_eq!(report.verdict(), Verdict::CannotSchedule);
    }

    #[test]
    fn test_partial_absence_time_of_day_overlap() {
        let a = appt(10);
        let tech = tech();
        let absences = vec![TechnicianAbsence::partial("T1", day(), t(9, 30), t(11, 0))];

        let clash = validate(&a, &tech, dt(9, 0), dt(10, 0), &[], &absences);
        assert!(kinds(&clash).contains(&FindingKind::AbsenceConflict));

        // Adjacent to the absence: no conflict.
        let clear = validate(&a, &tech, dt(8, 0), dt(9, 30), &[], &absences);
        assert!(!kinds(&clear).contains(&FindingKind::AbsenceConflict));
    }

    #[test]
    fn test_double_booking_exact_interval() {
        let a = appt(10);
        let tech = tech();
        let existing = vec![ScheduleAssignment::new("S1", "A2", "T1", dt(9, 0), dt(10, 0))];
        let report = validate(&a, &tech, dt(9, 0), dt(10, 0), &existing, &[]);
        assert!(kinds(&report).contains(&FindingKind::DoubleBooking));
    }

    #[test]
    fn test_adjacent_assignment_is_not_double_booking() {
        let a = appt(10);
        let tech = tech();
        let existing = vec![ScheduleAssignment::new("S1", "A2", "T1", dt(8, 0), dt(9, 0))];
        let report = validate(&a, &tech, dt(9, 0), dt(10, 0), &existing, &[]);
        assert!(!kinds(&report).contains(&FindingKind::DoubleBooking));
    }

    #[test]
    fn test_own_assignment_ignored_on_reassign() {
        let a = appt(10);
        let tech = tech();
        // The appointment's current slot, about to be replaced.
        let existing = vec![ScheduleAssignment::new("S1", "A1", "T1", dt(9, 0), dt(10, 0))];
        let report = validate(&a, &tech, dt(9, 0), dt(10, 0), &existing, &[]);
        assert!(!kinds(&report).contains(&FindingKind::DoubleBooking));
    }

    #[test]
    fn test_cancelled_assignment_ignored() {
        let a = appt(10);
        let tech = tech();
        let existing = vec![ScheduleAssignment::new("S1", "A2", "T1", dt(9, 0), dt(10, 0))
            .with_status(crate::models::AssignmentStatus::Cancelled)];
        let report = validate(&a, &tech, dt(9, 0), dt(10, 0), &existing, &[]);
        assert!(!kinds(&report).contains(&FindingKind::DoubleBooking));
    }

    #[test]
    fn test_working_hours_bounds() {
        let a = appt(10);
        let tech = tech();

        let early = validate(&a, &tech, dt(6, 0), dt(7, 0), &[], &[]);
        assert!(kinds(&early).contains(&FindingKind::OutsideWorkingHours));

        // End lands exactly on the closing hour: fails the hour check.
        let at_close = validate(&a, &tech, dt(17, 0), dt(18, 0), &[], &[]);
        assert!(kinds(&at_close).contains(&FindingKind::OutsideWorkingHours));

        let inside = validate(&a, &tech, dt(16, 0), dt(17, 59), &[], &[]);
        assert!(!kinds(&inside).contains(&FindingKind::OutsideWorkingHours));
    }

    #[test]
    fn test_skill_gap_lists_missing() {
        let a = appt(10)
            .with_required_skill("bodywork")
            .with_required_skill("paint");
        let tech = tech().with_skill("Engine Diagnostics");
        let report = validate(&a, &tech, dt(9, 0), dt(10, 0), &[], &[]);

        let gap = report
            .findings
            .iter()
            .find(|f| f.kind == FindingKind::SkillGap)
            .expect("skill gap finding");
        assert_eq!(gap.severity, Severity::Warning);
        assert!(gap.message.contains("bodywork"));
        assert!(gap.message.contains("paint"));
        assert_eq!(report.verdict(), Verdict::ScheduleAnyway);
    }

    #[test]
    fn test_skill_substring_counts_as_covered() {
        let a = appt(10).with_required_skill("engine");
        let tech = tech().with_skill("Engine Diagnostics");
        let report = validate(&a, &tech, dt(9, 0), dt(10, 0), &[], &[]);
        assert!(!kinds(&report).contains(&FindingKind::SkillGap));
    }

    #[test]
    fn test_sla_critical_blocks_but_stays_warning() {
        let a = appt(10).with_sla(dt(10, 0)); // 1h of headroom from 09:00
        let tech = tech();
        let report = validate(&a, &tech, dt(9, 0), dt(10, 0), &[], &[]);

        let sla = report
            .findings
            .iter()
            .find(|f| f.kind == FindingKind::SlaCritical)
            .expect("sla finding");
        assert_eq!(sla.severity, Severity::Warning);
        assert!(sla.blocking);
        assert!(!report.is_valid());
        // The button gate still treats it as a warning.
        assert_eq!(report.verdict(), Verdict::ScheduleAnyway);
    }

    #[test]
    fn test_sla_at_risk_is_advisory() {
        let a = appt(10).with_sla(dt(12, 0)); // 3h of headroom
        let tech = tech();
        let report = validate(&a, &tech, dt(9, 0), dt(10, 0), &[], &[]);

        assert!(kinds(&report).contains(&FindingKind::SlaAtRisk));
        assert!(report.is_valid());
    }

    #[test]
    fn test_sla_comfortable_no_finding() {
        let a = appt(10).with_sla(dt(16, 0)); // 7h of headroom
        let tech = tech();
        let report = validate(&a, &tech, dt(9, 0), dt(10, 0), &[], &[]);
        assert!(!kinds(&report).contains(&FindingKind::SlaAtRisk));
        assert!(!kinds(&report).contains(&FindingKind::SlaCritical));
    }

    #[test]
    fn test_vehicle_not_onsite_is_info() {
        let a = Appointment::new("A1", day(), "C1", "V1").with_estimate(10);
        let tech = tech();
        let report = validate(&a, &tech, dt(9, 0), dt(10, 0), &[], &[]);

        let finding = report
            .findings
            .iter()
            .find(|f| f.kind == FindingKind::VehicleNotOnsite)
            .expect("vehicle finding");
        assert_eq!(finding.severity, Severity::Info);
        // Info alone keeps the plain verdict.
        assert_eq!(report.verdict(), Verdict::Schedule);
    }

    #[test]
    fn test_parts_on_order_is_warning() {
        let a = appt(10).with_flag(crate::models::FLAG_PARTS_ORDERED);
        let tech = tech();
        let report = validate(&a, &tech, dt(9, 0), dt(10, 0), &[], &[]);
        assert!(kinds(&report).contains(&FindingKind::PartsOnOrder));
        assert_eq!(report.verdict(), Verdict::ScheduleAnyway);
    }

    #[test]
    fn test_overbooking_at_exactly_100_is_error() {
        let a = appt(20);
        let tech = tech(); // capacity 80
        let existing = vec![
            ScheduleAssignment::new("S1", "A2", "T1", dt(7, 0), dt(8, 0)).with_planned_aw(60),
        ];
        // 60 + 20 = 80 of 80 → exactly 100%
        let report = validate(&a, &tech, dt(9, 0), dt(11, 0), &existing, &[]);
        assert!(kinds(&report).contains(&FindingKind::Overbooked));
        assert!(!kinds(&report).contains(&FindingKind::NearCapacity));
    }

    #[test]
    fn test_overbooking_above_100() {
        let a = appt(30);
        let tech = tech();
        let existing = vec![
            ScheduleAssignment::new("S1", "A2", "T1", dt(7, 0), dt(8, 0)).with_planned_aw(60),
        ];
        let report = validate(&a, &tech, dt(9, 0), dt(12, 0), &existing, &[]);
        assert!(kinds(&report).contains(&FindingKind::Overbooked));
        assert_eq!(report.verdict(), Verdict::CannotSchedule);
    }

    #[test]
    fn test_near_capacity_band() {
        let a = appt(15);
        let tech = tech();
        let existing = vec![
            ScheduleAssignment::new("S1", "A2", "T1", dt(7, 0), dt(8, 0)).with_planned_aw(60),
        ];
        // 60 + 15 = 75 of 80 → 93.75%
        let report = validate(&a, &tech, dt(9, 0), dt(10, 30), &existing, &[]);
        assert!(kinds(&report).contains(&FindingKind::NearCapacity));
        assert!(!kinds(&report).contains(&FindingKind::Overbooked));
    }

    #[test]
    fn test_below_near_capacity_no_finding() {
        let a = appt(10);
        let tech = tech();
        // 10 of 80 → 12.5%
        let report = validate(&a, &tech, dt(9, 0), dt(10, 0), &[], &[]);
        assert!(!kinds(&report).contains(&FindingKind::NearCapacity));
        assert!(!kinds(&report).contains(&FindingKind::Overbooked));
    }

    #[test]
    fn test_all_checks_run_despite_errors() {
        // Absent all day AND double-booked AND out of hours AND overbooked.
        let a = Appointment::new("A1", day(), "C1", "V1")
            .with_estimate(90)
            .with_required_skill("paint");
        let tech = tech().with_skill("engine");
        let existing = vec![ScheduleAssignment::new("S1", "A2", "T1", dt(6, 0), dt(7, 0))];
        let absences = vec![TechnicianAbsence::full_day("T1", day())];

        let report = validate(&a, &tech, dt(6, 0), dt(15, 0), &existing, &absences);
        let found = kinds(&report);
        assert!(found.contains(&FindingKind::AbsenceConflict));
        assert!(found.contains(&FindingKind::DoubleBooking));
        assert!(found.contains(&FindingKind::OutsideWorkingHours));
        assert!(found.contains(&FindingKind::SkillGap));
        assert!(found.contains(&FindingKind::VehicleNotOnsite));
        assert!(found.contains(&FindingKind::Overbooked));
    }

    #[test]
    fn test_finding_order_matches_display_order() {
        let a = Appointment::new("A1", day(), "C1", "V1")
            .with_estimate(90)
            .with_required_skill("paint");
        let tech = tech();
        let absences = vec![TechnicianAbsence::full_day("T1", day())];
        let report = validate(&a, &tech, dt(6, 0), dt(15, 0), &[], &absences);

        let found = kinds(&report);
        assert_eq!(
            found,
            vec![
                FindingKind::AbsenceConflict,
                FindingKind::OutsideWorkingHours,
                FindingKind::SkillGap,
                FindingKind::VehicleNotOnsite,
                FindingKind::Overbooked,
            ]
        );
    }
}
