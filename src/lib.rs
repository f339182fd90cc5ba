//! Scheduling core for workshop management.
//!
//! Implements the planning-board logic of an auto-repair shop: the AW
//! work-unit time model (1 AW = 6 minutes), per-technician capacity
//! arithmetic, pre-commit validation of candidate assignments, the
//! appointment/assignment lifecycle, and the role-based access gate.
//!
//! Persistence, realtime change feeds, and notification delivery are
//! external collaborators, consumed through the [`store`] and [`notify`]
//! traits. This crate owns no CLI, wire protocol, or UI — it is a library
//! driven by interactive event handlers.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Technician`, `TechnicianAbsence`,
//!   `Appointment`, `ScheduleAssignment`, status enums
//! - **`aw`**: AW/minute/hour conversions, grid snapping, working hours
//! - **`capacity`**: available AW and utilization per technician-day
//! - **`validation`**: conflict/skill/SLA/capacity findings and verdict
//! - **`lifecycle`**: inbox/lane/status transitions and their writes
//! - **`rbac`**: role permission table and appointment access gates
//!
//! # Flow
//!
//! Drag-drop or a status button → [`lifecycle`] computes proposed timing
//! (via [`aw`]) → [`validation`] checks it against absences, existing
//! assignments, and capacity → on acceptance [`lifecycle`] issues the
//! persistence writes → [`rbac`] authorizes each one for the caller.

pub mod aw;
pub mod capacity;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod notify;
pub mod rbac;
pub mod store;
pub mod validation;
