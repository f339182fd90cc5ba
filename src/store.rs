//! Persistence collaborator seam.
//!
//! The real application persists through a hosted backend; this crate
//! only defines the contract it needs from it. [`InMemoryStore`] is a
//! complete in-process implementation used by the tests and handy for
//! prototyping.
//!
//! The contract is deliberately non-transactional: the lifecycle manager
//! awaits each write and checks its result before issuing the next one,
//! but nothing here groups writes atomically.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::{
    Appointment, AppointmentStatus, ScheduleAssignment, Technician, TechnicianAbsence,
};

/// CRUD surface the scheduling core needs from the persistence layer.
#[async_trait]
pub trait SchedulingStore: Send + Sync {
    /// Fetches an appointment by ID.
    async fn appointment(&self, id: &str) -> Result<Option<Appointment>, StoreError>;

    /// Creates or replaces an appointment row.
    async fn put_appointment(&self, appointment: Appointment) -> Result<(), StoreError>;

    /// Updates an appointment's status.
    async fn update_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<(), StoreError>;

    /// All assignments currently linked to an appointment.
    async fn assignments_for_appointment(
        &self,
        appointment_id: &str,
    ) -> Result<Vec<ScheduleAssignment>, StoreError>;

    /// A technician's assignments starting on the given day.
    async fn assignments_for_technician_on(
        &self,
        technician_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<ScheduleAssignment>, StoreError>;

    /// Creates an assignment row.
    async fn create_assignment(&self, assignment: ScheduleAssignment) -> Result<(), StoreError>;

    /// Deletes an assignment row.
    async fn delete_assignment(&self, id: &str) -> Result<(), StoreError>;

    /// A technician's absences on the given day.
    async fn absences_for_technician_on(
        &self,
        technician_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<TechnicianAbsence>, StoreError>;

    /// Records an absence.
    async fn put_absence(&self, absence: TechnicianAbsence) -> Result<(), StoreError>;

    /// Fetches a technician by ID.
    async fn technician(&self, id: &str) -> Result<Option<Technician>, StoreError>;

    /// Creates or replaces a technician row.
    async fn put_technician(&self, technician: Technician) -> Result<(), StoreError>;
}

#[derive(Default)]
struct StoreState {
    appointments: HashMap<String, Appointment>,
    assignments: HashMap<String, ScheduleAssignment>,
    absences: Vec<TechnicianAbsence>,
    technicians: HashMap<String, Technician>,
}

/// In-process store backed by hash maps behind an async lock.
///
/// `fail_deletes` lets tests exercise the interrupted delete-then-create
/// path without a second store implementation.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
    fail_deletes: Arc<AtomicBool>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `delete_assignment` fail until reset.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Total number of assignment rows (test convenience).
    pub async fn assignment_count(&self) -> usize {
        self.state.read().await.assignments.len()
    }
}

#[async_trait]
impl SchedulingStore for InMemoryStore {
    async fn appointment(&self, id: &str) -> Result<Option<Appointment>, StoreError> {
        Ok(self.state.read().await.appointments.get(id).cloned())
    }

    async fn put_appointment(&self, appointment: Appointment) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .appointments
            .insert(appointment.id.clone(), appointment);
        Ok(())
    }

    async fn update_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let appointment = state
            .appointments
            .get_mut(id)
            .ok_or_else(|| StoreError::AppointmentNotFound(id.to_string()))?;
        appointment.status = status;
        Ok(())
    }

    async fn assignments_for_appointment(
        &self,
        appointment_id: &str,
    ) -> Result<Vec<ScheduleAssignment>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .assignments
            .values()
            .filter(|a| a.appointment_id == appointment_id)
            .cloned()
            .collect())
    }

    async fn assignments_for_technician_on(
        &self,
        technician_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<ScheduleAssignment>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .assignments
            .values()
            .filter(|a| a.technician_id == technician_id && a.start_time.date() == date)
            .cloned()
            .collect())
    }

    async fn create_assignment(&self, assignment: ScheduleAssignment) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .assignments
            .insert(assignment.id.clone(), assignment);
        Ok(())
    }

    async fn delete_assignment(&self, id: &str) -> Result<(), StoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("delete rejected".into()));
        }
        self.state
            .write()
            .await
            .assignments
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::AssignmentNotFound(id.to_string()))
    }

    async fn absences_for_technician_on(
        &self,
        technician_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<TechnicianAbsence>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .absences
            .iter()
            .filter(|a| a.technician_id == technician_id && a.date == date)
            .cloned()
            .collect())
    }

    async fn put_absence(&self, absence: TechnicianAbsence) -> Result<(), StoreError> {
        self.state.write().await.absences.push(absence);
        Ok(())
    }

    async fn technician(&self, id: &str) -> Result<Option<Technician>, StoreError> {
        Ok(self.state.read().await.technicians.get(id).cloned())
    }

    async fn put_technician(&self, technician: Technician) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .technicians
            .insert(technician.id.clone(), technician);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 12).unwrap()
    }

    fn dt(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    #[tokio::test]
    async fn test_appointment_round_trip() {
        let store = InMemoryStore::new();
        let appt = Appointment::new("A1", day(), "C1", "V1").with_estimate(10);
        store.put_appointment(appt).await.unwrap();

        let fetched = store.appointment("A1").await.unwrap().unwrap();
        assert_eq!(fetched.aw_estimate, 10);
        assert!(store.appointment("A2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_update_requires_existing_row() {
        let store = InMemoryStore::new();
        let err = store
            .update_appointment_status("missing", AppointmentStatus::Assigned)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::AppointmentNotFound("missing".into()));
    }

    #[tokio::test]
    async fn test_assignment_filters() {
        let store = InMemoryStore::new();
        store
            .create_assignment(ScheduleAssignment::new("S1", "A1", "T1", dt(9, 0), dt(10, 0)))
            .await
            .unwrap();
        store
            .create_assignment(ScheduleAssignment::new("S2", "A2", "T2", dt(9, 0), dt(10, 0)))
            .await
            .unwrap();

        let for_a1 = store.assignments_for_appointment("A1").await.unwrap();
        assert_eq!(for_a1.len(), 1);
        assert_eq!(for_a1[0].id, "S1");

        let for_t2 = store
            .assignments_for_technician_on("T2", day())
            .await
            .unwrap();
        assert_eq!(for_t2.len(), 1);

        let other_day = day().succ_opt().unwrap();
        assert!(store
            .assignments_for_technician_on("T2", other_day)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_assignment_errors() {
        let store = InMemoryStore::new();
        let err = store.delete_assignment("S9").await.unwrap_err();
        assert_eq!(err, StoreError::AssignmentNotFound("S9".into()));
    }

    #[tokio::test]
    async fn test_fail_deletes_toggle() {
        let store = InMemoryStore::new();
        store
            .create_assignment(ScheduleAssignment::new("S1", "A1", "T1", dt(9, 0), dt(10, 0)))
            .await
            .unwrap();

        store.set_fail_deletes(true);
        assert!(store.delete_assignment("S1").await.is_err());

        store.set_fail_deletes(false);
        assert!(store.delete_assignment("S1").await.is_ok());
        assert_eq!(store.assignment_count().await, 0);
    }

    #[tokio::test]
    async fn test_absence_day_filter() {
        let store = InMemoryStore::new();
        store
            .put_absence(TechnicianAbsence::full_day("T1", day()))
            .await
            .unwrap();

        assert_eq!(
            store
                .absences_for_technician_on("T1", day())
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(store
            .absences_for_technician_on("T1", day().succ_opt().unwrap())
            .await
            .unwrap()
            .is_empty());
    }
}
