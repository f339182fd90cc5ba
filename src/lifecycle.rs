//! Assignment lifecycle manager.
//!
//! Drives an appointment between the inbox, a technician lane, and the
//! terminal states, keeping its status consistent with the existence of
//! a live schedule assignment.
//!
//! Reassignment is a two-phase intent: [`LifecycleManager::plan_assignment`]
//! computes proposed timing and the set of assignments being replaced;
//! [`LifecycleManager::commit_assignment`] performs the awaited
//! delete-then-create sequence. Each write is checked before the next one
//! is issued, so two live assignments never exist from this client's
//! perspective — but the sequence is not atomic at the persistence layer,
//! and a mid-sequence failure leaves earlier writes in place. The caller
//! then re-fetches authoritative state; no in-memory rollback is attempted.

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::aw::{self, DEFAULT_GRID_MINUTES};
use crate::error::LifecycleError;
use crate::models::{Appointment, AppointmentStatus, ScheduleAssignment};
use crate::notify::Notifier;
use crate::store::SchedulingStore;

/// The technician's one-tap progression for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextAction {
    /// Status the appointment moves to.
    pub target: AppointmentStatus,
    /// Button label shown to the technician.
    pub label: &'static str,
}

/// Fixed per-status progression map for the technician's progress button.
///
/// Terminal states have no next action.
pub fn next_action(status: AppointmentStatus) -> Option<NextAction> {
    use AppointmentStatus::*;
    match status {
        Waiting | Assigned => Some(NextAction {
            target: InProgress,
            label: "Start Work",
        }),
        InProgress => Some(NextAction {
            target: Completed,
            label: "Complete",
        }),
        Paused => Some(NextAction {
            target: InProgress,
            label: "Resume",
        }),
        WaitingParts => Some(NextAction {
            target: InProgress,
            label: "Continue",
        }),
        Completed | Delivered | Cancelled => None,
    }
}

/// Prepared intent to place an appointment on a technician lane.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentPlan {
    /// Appointment being placed.
    pub appointment_id: String,
    /// Target lane.
    pub technician_id: String,
    /// Proposed start (now, rounded up to the next grid boundary).
    pub start: NaiveDateTime,
    /// Proposed end (`max(aw_estimate * 6, 15)` minutes after start).
    pub end: NaiveDateTime,
    /// Planned effort carried onto the assignment.
    pub aw_planned: i64,
    /// IDs of live assignments that must be removed first.
    pub replaces: Vec<String>,
}

/// Owns the status/assignment transitions for the planning board.
///
/// Constructed and owned by the composing application; holds no global
/// state and no background tasks.
pub struct LifecycleManager<S, N> {
    store: S,
    notifier: N,
}

impl<S: SchedulingStore, N: Notifier> LifecycleManager<S, N> {
    /// Creates a manager over a store and a notifier.
    pub fn new(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns an appointment to the inbox.
    ///
    /// Deletes its assignments as a set (there should be at most one live
    /// one; stale duplicates are removed too), then sets the status to
    /// `Waiting`. Stops at the first failing write.
    pub async fn return_to_inbox(&self, appointment_id: &str) -> Result<(), LifecycleError> {
        let existing = self.store.assignments_for_appointment(appointment_id).await?;
        let mut steps = 0usize;
        for assignment in &existing {
            self.store
                .delete_assignment(&assignment.id)
                .await
                .map_err(|e| LifecycleError::after_steps(steps, e))?;
            steps += 1;
        }
        self.store
            .update_appointment_status(appointment_id, AppointmentStatus::Waiting)
            .await
            .map_err(|e| LifecycleError::after_steps(steps, e))?;
        debug!(appointment_id, "appointment returned to inbox");
        Ok(())
    }

    /// Prepares placement of an appointment on a technician lane.
    ///
    /// Default timing policy: start at `now` rounded up to the next
    /// 15-minute boundary, duration `max(aw_estimate * 6, 15)` minutes.
    pub async fn plan_assignment(
        &self,
        appointment: &Appointment,
        technician_id: &str,
        now: NaiveDateTime,
    ) -> Result<AssignmentPlan, LifecycleError> {
        let start = aw::ceil_to_grid(now, DEFAULT_GRID_MINUTES);
        let minutes = aw::aw_to_minutes(appointment.aw_estimate).max(DEFAULT_GRID_MINUTES as i64);
        let replaces = self
            .store
            .assignments_for_appointment(&appointment.id)
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect();

        Ok(AssignmentPlan {
            appointment_id: appointment.id.clone(),
            technician_id: technician_id.to_string(),
            start,
            end: start + Duration::minutes(minutes),
            aw_planned: appointment.aw_estimate,
            replaces,
        })
    }

    /// Commits a prepared plan: delete replaced assignments, create the
    /// new one, set the appointment to `Assigned` — in that order, each
    /// write awaited and checked.
    pub async fn commit_assignment(
        &self,
        plan: &AssignmentPlan,
    ) -> Result<ScheduleAssignment, LifecycleError> {
        let mut steps = 0usize;
        for id in &plan.replaces {
            self.store
                .delete_assignment(id)
                .await
                .map_err(|e| LifecycleError::after_steps(steps, e))?;
            steps += 1;
        }

        let assignment = ScheduleAssignment::new(
            Uuid::new_v4().to_string(),
            &plan.appointment_id,
            &plan.technician_id,
            plan.start,
            plan.end,
        )
        .with_planned_aw(plan.aw_planned);

        self.store
            .create_assignment(assignment.clone())
            .await
            .map_err(|e| LifecycleError::after_steps(steps, e))?;
        steps += 1;

        self.store
            .update_appointment_status(&plan.appointment_id, AppointmentStatus::Assigned)
            .await
            .map_err(|e| LifecycleError::after_steps(steps, e))?;

        debug!(
            appointment_id = %plan.appointment_id,
            technician_id = %plan.technician_id,
            start = %plan.start,
            "appointment assigned"
        );
        Ok(assignment)
    }

    /// Plans and commits in one call (the drag-drop handler's path).
    pub async fn assign(
        &self,
        appointment: &Appointment,
        technician_id: &str,
        now: NaiveDateTime,
    ) -> Result<ScheduleAssignment, LifecycleError> {
        let plan = self.plan_assignment(appointment, technician_id, now).await?;
        self.commit_assignment(&plan).await
    }

    /// Moves an appointment to a status directly (status-column drag).
    ///
    /// Does not touch assignment rows. Entering `Completed` or
    /// `Delivered` fires the completion notification; delivery failures
    /// are logged and swallowed.
    pub async fn move_to_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> Result<(), LifecycleError> {
        self.store
            .update_appointment_status(appointment_id, status)
            .await?;

        if matches!(
            status,
            AppointmentStatus::Completed | AppointmentStatus::Delivered
        ) {
            match self.store.appointment(appointment_id).await {
                Ok(Some(appointment)) => {
                    if let Err(err) = self.notifier.appointment_completed(&appointment).await {
                        warn!(appointment_id, %err, "completion notification failed");
                    }
                }
                Ok(None) => warn!(appointment_id, "completed appointment vanished before notify"),
                Err(err) => warn!(appointment_id, %err, "could not load appointment for notify"),
            }
        }
        Ok(())
    }

    /// Applies the progress button: advances along the next-action map.
    ///
    /// Returns the new status, or `None` when the appointment is in a
    /// terminal state.
    pub async fn advance(
        &self,
        appointment: &Appointment,
    ) -> Result<Option<AppointmentStatus>, LifecycleError> {
        match next_action(appointment.status) {
            Some(action) => {
                self.move_to_status(&appointment.id, action.target).await?;
                Ok(Some(action.target))
            }
            None => Ok(None),
        }
    }
}
