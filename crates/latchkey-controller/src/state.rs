//! Door lock state machine.
//!
//! This module tracks which mode the controller is in, enforces the legal
//! transitions between modes, and keeps a bounded history of transitions for
//! diagnostics.
//!
//! # States
//!
//! - `Locked`: idle, waiting for a code. Initial state and the end of every
//!   cycle.
//! - `Unlocking` / `GuestAccess`: door opening after the secret or guest code
//! - `Failing`: wrong-code warning
//! - `SpecialMode(profile)`: alert sequence of a special-mode profile
//! - `Lockdown`: input ignored after too many failures
//! - `Panic`: silent panic sequence
//! - `AdminAwaitingNew` / `AdminAwaitingConfirm`: secret code change session
//!
//! # Valid Transitions
//!
//! - Locked → any mode state
//! - any mode state → Locked
//! - AdminAwaitingNew → AdminAwaitingConfirm
//!
//! # Examples
//!
//! ```
//! use latchkey_controller::{LockState, StateMachine};
//!
//! let mut machine = StateMachine::new();
//! assert_eq!(machine.current_state(), LockState::Locked);
//!
//! machine.transition_to(LockState::AdminAwaitingNew).unwrap();
//! machine.transition_to(LockState::AdminAwaitingConfirm).unwrap();
//!
//! // Confirmation cannot start a new session
//! assert!(machine.transition_to(LockState::AdminAwaitingNew).is_err());
//! ```

use crate::profile::SpecialModeProfile;
use chrono::{DateTime, Utc};
use latchkey_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Maximum number of state transitions to keep in history.
///
/// A full access cycle is two transitions (into a mode and back to Locked),
/// so this covers the last fifty or so interactions.
const MAX_HISTORY_SIZE: usize = 100;

/// Every mode the controller can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    Locked,
    Unlocking,
    Failing,
    SpecialMode(SpecialModeProfile),
    Lockdown,
    Panic,
    GuestAccess,
    AdminAwaitingNew,
    AdminAwaitingConfirm,
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockState::Locked => write!(f, "Locked"),
            LockState::Unlocking => write!(f, "Unlocking"),
            LockState::Failing => write!(f, "Failing"),
            LockState::SpecialMode(profile) => write!(f, "SpecialMode({profile})"),
            LockState::Lockdown => write!(f, "Lockdown"),
            LockState::Panic => write!(f, "Panic"),
            LockState::GuestAccess => write!(f, "GuestAccess"),
            LockState::AdminAwaitingNew => write!(f, "AdminAwaitingNew"),
            LockState::AdminAwaitingConfirm => write!(f, "AdminAwaitingConfirm"),
        }
    }
}

impl LockState {
    /// Check if transition to `target` is legal from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use latchkey_controller::LockState;
    ///
    /// assert!(LockState::Locked.can_transition_to(&LockState::Unlocking));
    /// assert!(LockState::Unlocking.can_transition_to(&LockState::Locked));
    /// assert!(!LockState::Unlocking.can_transition_to(&LockState::Panic));
    /// ```
    pub fn can_transition_to(&self, target: &LockState) -> bool {
        matches!(
            (self, target),
            // From Locked into any mode
            (
                LockState::Locked,
                LockState::Unlocking
                    | LockState::Failing
                    | LockState::SpecialMode(_)
                    | LockState::Lockdown
                    | LockState::Panic
                    | LockState::GuestAccess
                    | LockState::AdminAwaitingNew
            )
            // Every mode ends locked
            | (
                LockState::Unlocking
                    | LockState::Failing
                    | LockState::SpecialMode(_)
                    | LockState::Lockdown
                    | LockState::Panic
                    | LockState::GuestAccess
                    | LockState::AdminAwaitingNew
                    | LockState::AdminAwaitingConfirm,
                LockState::Locked
            )
            // Admin session
            | (LockState::AdminAwaitingNew, LockState::AdminAwaitingConfirm)
        )
    }
}

/// A single state transition with its wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: LockState,
    pub to: LockState,
    pub at: DateTime<Utc>,
}

impl StateTransition {
    pub fn new(from: LockState, to: LockState) -> Self {
        Self {
            from,
            to,
            at: Utc::now(),
        }
    }
}

/// Tracks the current [`LockState`] and its recent history.
///
/// Not thread-safe; owned by the mode controller on the main loop task.
#[derive(Debug)]
pub struct StateMachine {
    current_state: LockState,

    /// Tokio clock, so paused tests see virtual time.
    state_entered_at: Instant,

    /// Oldest first, at most `MAX_HISTORY_SIZE` entries.
    history: VecDeque<StateTransition>,
}

impl StateMachine {
    /// Create a state machine in the `Locked` state.
    pub fn new() -> Self {
        Self {
            current_state: LockState::Locked,
            state_entered_at: Instant::now(),
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn current_state(&self) -> LockState {
        self.current_state
    }

    /// Time since the last transition, on the tokio clock.
    pub fn time_in_current_state(&self) -> Duration {
        self.state_entered_at.elapsed()
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// The last `count` transitions, oldest first.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        let skip = self.history.len().saturating_sub(count);
        self.history.iter().skip(skip).cloned().collect()
    }

    /// Move to `new_state` after validating the transition.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the transition is not in
    /// the table; the state is left unchanged.
    pub fn transition_to(&mut self, new_state: LockState) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(self.current_state, new_state);
        self.current_state = new_state;
        self.state_entered_at = Instant::now();
        self.add_to_history(transition.clone());

        Ok(transition)
    }

    fn add_to_history(&mut self, transition: StateTransition) {
        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_new_machine_starts_locked() {
        let machine = StateMachine::new();
        assert_eq!(machine.current_state(), LockState::Locked);
        assert!(machine.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_in_state_restarts_on_transition() {
        let mut machine = StateMachine::new();
        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(machine.time_in_current_state(), Duration::from_secs(3));

        machine.transition_to(LockState::Unlocking).unwrap();
        tokio::time::advance(Duration::from_millis(250)).await;
        assert_eq!(machine.time_in_current_state(), Duration::from_millis(250));
    }

    #[rstest]
    #[case(LockState::Unlocking)]
    #[case(LockState::Failing)]
    #[case(LockState::SpecialMode(SpecialModeProfile::Trap))]
    #[case(LockState::Lockdown)]
    #[case(LockState::Panic)]
    #[case(LockState::GuestAccess)]
    #[case(LockState::AdminAwaitingNew)]
    fn test_mode_round_trip(#[case] mode: LockState) {
        let mut machine = StateMachine::new();
        machine.transition_to(mode).unwrap();
        assert_eq!(machine.current_state(), mode);

        let back = machine.transition_to(LockState::Locked).unwrap();
        assert_eq!(back.from, mode);
        assert_eq!(back.to, LockState::Locked);
        assert_eq!(machine.history().len(), 2);
    }

    #[rstest]
    #[case(LockState::Locked, LockState::Locked)]
    #[case(LockState::Locked, LockState::AdminAwaitingConfirm)]
    #[case(LockState::Unlocking, LockState::Failing)]
    #[case(LockState::Lockdown, LockState::Unlocking)]
    #[case(LockState::AdminAwaitingConfirm, LockState::AdminAwaitingNew)]
    fn test_invalid_transitions(#[case] from: LockState, #[case] to: LockState) {
        assert!(!from.can_transition_to(&to));
    }

    #[test]
    fn test_invalid_transition_leaves_state() {
        let mut machine = StateMachine::new();
        let err = machine.transition_to(LockState::Locked).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid state transition from Locked to Locked"
        );
        assert_eq!(machine.current_state(), LockState::Locked);
        assert!(machine.history().is_empty());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut machine = StateMachine::new();
        for _ in 0..60 {
            machine.transition_to(LockState::Failing).unwrap();
            machine.transition_to(LockState::Locked).unwrap();
        }
        assert_eq!(machine.history().len(), MAX_HISTORY_SIZE);

        let last = machine.last_transitions(2);
        assert_eq!(last.len(), 2);
        assert_eq!(last[0].to, LockState::Failing);
        assert_eq!(last[1].to, LockState::Locked);
    }

    #[test]
    fn test_transition_serialization() {
        let transition = StateTransition::new(
            LockState::Locked,
            LockState::SpecialMode(SpecialModeProfile::Disco),
        );
        let json = serde_json::to_value(&transition).unwrap();
        assert_eq!(json["from"], "locked");
        assert_eq!(json["to"]["special_mode"], "disco");

        let back: StateTransition = serde_json::from_value(json).unwrap();
        assert_eq!(back, transition);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            LockState::SpecialMode(SpecialModeProfile::Ambulance).to_string(),
            "SpecialMode(Ambulance)"
        );
    }
}
