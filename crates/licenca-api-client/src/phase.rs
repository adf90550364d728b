//! Lifecycle of a single upload attempt

use crate::UploadError;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    Selected,
    Validating,
    Rejected,
    Validated,
    RequestingCredential,
    Transferring,
    Persisting,
    Done,
    Failed,
}

impl UploadPhase {
    /// Phases in which work is under way and a failure can occur
    pub fn is_active(self) -> bool {
        matches!(
            self,
            UploadPhase::Selected
                | UploadPhase::Validating
                | UploadPhase::Validated
                | UploadPhase::RequestingCredential
                | UploadPhase::Transferring
                | UploadPhase::Persisting
        )
    }

    pub fn can_transition_to(self, next: UploadPhase) -> bool {
        use UploadPhase::*;
        match (self, next) {
            (from, Failed) => from.is_active(),
            (Idle, Selected)
            | (Selected, Validating)
            | (Validating, Rejected)
            | (Validating, Validated)
            | (Rejected, Idle)
            | (Validated, RequestingCredential)
            | (RequestingCredential, Transferring)
            | (Transferring, Persisting)
            | (Persisting, Done)
            | (Failed, Idle) => true,
            _ => false,
        }
    }
}

/// Observable phase and progress of one upload attempt.
///
/// Progress is a percentage synthesized while the transfer runs; see
/// [`crate::progress`].
///
/// A failed attempt stays in [`UploadPhase::Failed`] with progress 0 so the
/// failure remains observable after `run` returns. The tracker only goes
/// back to `Idle` through [`UploadTracker::reset`], or when
/// [`crate::UploadOrchestrator::run`] starts the next attempt with it.
/// A rejected file is different: the attempt returns to `Idle` at once.
#[derive(Debug)]
pub struct UploadTracker {
    phase: watch::Sender<UploadPhase>,
    progress: watch::Sender<u8>,
}

impl Default for UploadTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadTracker {
    pub fn new() -> Self {
        Self {
            phase: watch::Sender::new(UploadPhase::Idle),
            progress: watch::Sender::new(0),
        }
    }

    pub fn phase(&self) -> UploadPhase {
        *self.phase.borrow()
    }

    pub fn progress(&self) -> u8 {
        *self.progress.borrow()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<UploadPhase> {
        self.phase.subscribe()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<u8> {
        self.progress.subscribe()
    }

    pub(crate) fn progress_sender(&self) -> &watch::Sender<u8> {
        &self.progress
    }

    /// Move to `next`, refusing transitions the lifecycle does not allow.
    pub fn advance(&self, next: UploadPhase) -> Result<(), UploadError> {
        let mut from = UploadPhase::Idle;
        let moved = self.phase.send_if_modified(|phase| {
            from = *phase;
            if phase.can_transition_to(next) {
                *phase = next;
                true
            } else {
                false
            }
        });
        if moved {
            tracing::trace!(?from, to = ?next, "Upload phase changed");
            Ok(())
        } else {
            Err(UploadError::IllegalTransition { from, to: next })
        }
    }

    /// Record `err` as the outcome of the attempt and hand it back.
    pub(crate) fn fail(&self, err: UploadError) -> UploadError {
        if self.advance(UploadPhase::Failed).is_ok() {
            self.progress.send_replace(0);
        }
        err
    }

    /// Return a failed tracker to `Idle` so a new attempt can start.
    pub fn reset(&self) -> Result<(), UploadError> {
        self.advance(UploadPhase::Idle)
    }
}
