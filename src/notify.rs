//! Notification collaborator seam.
//!
//! Completion notifications are fire-and-forget: the lifecycle manager
//! invokes the notifier after a status write succeeds and swallows any
//! delivery failure (logged, never propagated). A failed toast must not
//! undo a finished job.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Appointment;

/// Notification delivery failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Delivers user-facing notifications about scheduling events.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announces that an appointment reached a completed state.
    async fn appointment_completed(&self, appointment: &Appointment) -> Result<(), NotifyError>;
}

/// Notifier that drops everything. Default for tests and headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn appointment_completed(&self, _appointment: &Appointment) -> Result<(), NotifyError> {
        Ok(())
    }
}
