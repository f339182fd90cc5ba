//! Role-based access control for scheduling resources.
//!
//! A static permission table maps each role to the (resource, action)
//! pairs it may perform, optionally guarded by a context predicate.
//! Resolution is deny-by-default: no matching entry means no access.
//! Permissions are evaluated per call; nothing is cached.
//!
//! Admins hold unconditional CRUD on every scheduling resource.
//! Technicians see and update only work linked to them and get read-only
//! context (customers, vehicles) for it.

use serde::{Deserialize, Serialize};

use crate::models::ScheduleAssignment;

/// Caller role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Workshop management: full CRUD, unconditional.
    Admin,
    /// Shop-floor technician: own work only.
    Technician,
}

/// An authenticated caller.
///
/// For technician users, `id` equals the technician record's ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Caller identifier.
    pub id: String,
    /// Caller role.
    pub role: Role,
}

impl User {
    /// Creates an admin user.
    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Admin,
        }
    }

    /// Creates a technician user.
    pub fn technician(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Technician,
        }
    }
}

/// Protected resource kinds, matching the persistence tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Appointments,
    ScheduleAssignments,
    Technicians,
    TechnicianAbsences,
    Customers,
    Vehicles,
}

/// Actions on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

/// Call-site context a predicate may inspect.
#[derive(Debug, Clone, Default)]
pub struct AccessContext {
    /// Technician linked to the record under access, when known.
    pub technician_id: Option<String>,
}

impl AccessContext {
    /// Context for a record linked to the given technician.
    pub fn for_technician(technician_id: impl Into<String>) -> Self {
        Self {
            technician_id: Some(technician_id.into()),
        }
    }
}

type Predicate = fn(&User, &AccessContext) -> bool;

/// One row of the permission table.
struct Permission {
    resource: ResourceKind,
    action: Action,
    predicate: Option<Predicate>,
}

const fn allow(resource: ResourceKind, action: Action) -> Permission {
    Permission {
        resource,
        action,
        predicate: None,
    }
}

const fn allow_if(resource: ResourceKind, action: Action, predicate: Predicate) -> Permission {
    Permission {
        resource,
        action,
        predicate: Some(predicate),
    }
}

/// Predicate: the record must be linked to the acting technician.
fn own_record(user: &User, ctx: &AccessContext) -> bool {
    ctx.technician_id.as_deref() == Some(user.id.as_str())
}

static ADMIN_PERMISSIONS: &[Permission] = &[
    allow(ResourceKind::Appointments, Action::Read),
    allow(ResourceKind::Appointments, Action::Create),
    allow(ResourceKind::Appointments, Action::Update),
    allow(ResourceKind::Appointments, Action::Delete),
    allow(ResourceKind::ScheduleAssignments, Action::Read),
    allow(ResourceKind::ScheduleAssignments, Action::Create),
    allow(ResourceKind::ScheduleAssignments, Action::Update),
    allow(ResourceKind::ScheduleAssignments, Action::Delete),
    allow(ResourceKind::Technicians, Action::Read),
    allow(ResourceKind::Technicians, Action::Create),
    allow(ResourceKind::Technicians, Action::Update),
    allow(ResourceKind::Technicians, Action::Delete),
    allow(ResourceKind::TechnicianAbsences, Action::Read),
    allow(ResourceKind::TechnicianAbsences, Action::Create),
    allow(ResourceKind::TechnicianAbsences, Action::Update),
    allow(ResourceKind::TechnicianAbsences, Action::Delete),
    allow(ResourceKind::Customers, Action::Read),
    allow(ResourceKind::Customers, Action::Create),
    allow(ResourceKind::Customers, Action::Update),
    allow(ResourceKind::Customers, Action::Delete),
    allow(ResourceKind::Vehicles, Action::Read),
    allow(ResourceKind::Vehicles, Action::Create),
    allow(ResourceKind::Vehicles, Action::Update),
    allow(ResourceKind::Vehicles, Action::Delete),
];

static TECHNICIAN_PERMISSIONS: &[Permission] = &[
    allow_if(ResourceKind::Appointments, Action::Read, own_record),
    allow_if(ResourceKind::Appointments, Action::Update, own_record),
    allow_if(ResourceKind::ScheduleAssignments, Action::Read, own_record),
    allow_if(ResourceKind::Technicians, Action::Read, own_record),
    allow_if(ResourceKind::TechnicianAbsences, Action::Read, own_record),
    allow(ResourceKind::Customers, Action::Read),
    allow(ResourceKind::Vehicles, Action::Read),
];

fn permissions_for(role: Role) -> &'static [Permission] {
    match role {
        Role::Admin => ADMIN_PERMISSIONS,
        Role::Technician => TECHNICIAN_PERMISSIONS,
    }
}

/// Resolves a permission check. Deny when no table entry matches.
pub fn has_permission(
    user: &User,
    resource: ResourceKind,
    action: Action,
    ctx: &AccessContext,
) -> bool {
    permissions_for(user.role)
        .iter()
        .filter(|p| p.resource == resource && p.action == action)
        .any(|p| match p.predicate {
            Some(check) => check(user, ctx),
            None => true,
        })
}

/// Whether the caller may view an appointment.
///
/// Admins always pass. Technicians pass only when one of the
/// appointment's assignments links them to it.
pub fn can_view_appointment(user: &User, assignments: &[ScheduleAssignment]) -> bool {
    check_appointment_access(user, Action::Read, assignments)
}

/// Whether the caller may update an appointment. Same linkage rule as
/// [`can_view_appointment`].
pub fn can_update_appointment(user: &User, assignments: &[ScheduleAssignment]) -> bool {
    check_appointment_access(user, Action::Update, assignments)
}

fn check_appointment_access(
    user: &User,
    action: Action,
    assignments: &[ScheduleAssignment],
) -> bool {
    if user.role == Role::Admin {
        return has_permission(user, ResourceKind::Appointments, action, &AccessContext::default());
    }
    assignments
        .iter()
        .filter(|a| a.is_live())
        .any(|a| {
            has_permission(
                user,
                ResourceKind::Appointments,
                action,
                &AccessContext::for_technician(&a.technician_id),
            )
        })
}
