//! Workshop scheduling domain models.
//!
//! Core data types for the planning board: technicians and their
//! absences, appointments, and the assignments that pin an appointment
//! to a technician lane. Customers and vehicles are read-only context
//! owned elsewhere; only their IDs appear here.
//!
//! | Entity | Board role |
//! |--------|------------|
//! | `Technician` | One lane per active technician |
//! | `Appointment` | A job card, in the inbox or on a lane |
//! | `ScheduleAssignment` | The card's pinned time range on a lane |
//! | `TechnicianAbsence` | Blocked time, full-day or partial |

mod appointment;
mod assignment;
mod technician;

pub use appointment::{
    Appointment, AppointmentStatus, Priority, FLAG_PARTS_ORDERED, FLAG_VEHICLE_ONSITE,
};
pub use assignment::{AssignmentStatus, ScheduleAssignment};
pub use technician::{skills_from_specialization, Technician, TechnicianAbsence};
