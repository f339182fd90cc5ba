//! Error types for the scheduling core.
//!
//! Expected domain conditions (absence conflicts, overbooking, out-of-hours
//! proposals) are modeled as validation findings, not errors — see
//! [`crate::validation`]. The types here cover the unexpected path only:
//! persistence failures and multi-step transitions interrupted midway.

use thiserror::Error;

/// Failure reported by the persistence collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No appointment row exists for the given ID.
    #[error("appointment not found: {0}")]
    AppointmentNotFound(String),
    /// No schedule assignment row exists for the given ID.
    #[error("assignment not found: {0}")]
    AssignmentNotFound(String),
    /// The backing store rejected or failed the operation.
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Failure raised by the assignment lifecycle manager.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A write failed before any state was changed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A write failed partway through a delete-then-create sequence.
    ///
    /// Earlier steps have already been persisted and are not rolled back;
    /// the caller must re-fetch authoritative state before retrying.
    #[error("transition interrupted after {completed_steps} persisted step(s), re-fetch state: {source}")]
    PartialTransition {
        /// Number of writes that succeeded before the failure.
        completed_steps: usize,
        /// The failing store operation.
        source: StoreError,
    },
}

impl LifecycleError {
    pub(crate) fn after_steps(completed_steps: usize, source: StoreError) -> Self {
        if completed_steps == 0 {
            Self::Store(source)
        } else {
            Self::PartialTransition {
                completed_steps,
                source,
            }
        }
    }
}
