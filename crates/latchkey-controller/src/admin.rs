//! The two-step secret code change protocol.
//!
//! ```text
//! Inactive --admin code--> AwaitingNew --4 digits--> AwaitingConfirm --same code--> commit
//!                              |                           |
//!                              +--other/clear--> abort     +--mismatch/clear--> abort
//! ```
//!
//! [`AdminSession`] is the pure protocol state; the controller plays the
//! tones and blinks for each [`AdminEvent`].

use latchkey_core::{Code, Rejection};
use latchkey_keypad::Submission;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminStep {
    #[default]
    Inactive,
    AwaitingNew,
    AwaitingConfirm,
}

/// What a submission did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminEvent {
    /// New code accepted; waiting for confirmation.
    Staged,

    /// Confirmation matched. The session is over; commit this code.
    Confirmed(Code),

    /// Session aborted without committing.
    Rejected(Rejection),
}

/// At most one admin session exists; it lives while `step != Inactive`.
#[derive(Debug, Clone, Default)]
pub struct AdminSession {
    step: AdminStep,
    staged: Option<Code>,
}

impl AdminSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> AdminStep {
        self.step
    }

    pub fn is_active(&self) -> bool {
        self.step != AdminStep::Inactive
    }

    /// Start a session, discarding any previous one.
    pub fn begin(&mut self) {
        self.step = AdminStep::AwaitingNew;
        self.staged = None;
    }

    /// Drop the session and any staged code.
    pub fn abort(&mut self) {
        self.step = AdminStep::Inactive;
        self.staged = None;
    }

    /// Feed a finalized entry. Returns `None` if no session is active.
    pub fn submit(&mut self, submission: Submission) -> Option<AdminEvent> {
        match self.step {
            AdminStep::Inactive => None,
            AdminStep::AwaitingNew => match submission {
                Submission::Complete(code) => {
                    self.staged = Some(code);
                    self.step = AdminStep::AwaitingConfirm;
                    Some(AdminEvent::Staged)
                }
                Submission::Partial(_) => {
                    self.abort();
                    Some(AdminEvent::Rejected(Rejection::InvalidAdminFormat))
                }
            },
            AdminStep::AwaitingConfirm => {
                let staged = self.staged.take();
                self.abort();
                match (staged, submission) {
                    (Some(staged), Submission::Complete(code)) if staged == code => {
                        Some(AdminEvent::Confirmed(code))
                    }
                    _ => Some(AdminEvent::Rejected(Rejection::AdminConfirmMismatch)),
                }
            }
        }
    }
}
