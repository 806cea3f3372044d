//! Access control logic for the latchkey door controller.
//!
//! This crate contains the mode state machine, the code registry, the
//! lockdown and admin protocols, the buzzer arbiter, and the keypad main loop
//! that drives them.
//!
//! # Example
//!
//! ```
//! use latchkey_controller::{BuzzerArbiter, Doorlock, LockState, ModeController};
//! use latchkey_core::LockConfig;
//! use latchkey_hardware::mock::{MockSensor, RecordingActuator};
//! use latchkey_keypad::KeypadReader;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() -> latchkey_controller::Result<()> {
//! let config = LockConfig::default();
//! let (sensor, keys) = MockSensor::new();
//! let outputs = RecordingActuator::new();
//!
//! let controller = ModeController::new(
//!     &config,
//!     Arc::new(outputs.clone()),
//!     BuzzerArbiter::new(outputs.clone()),
//! );
//! let reader = KeypadReader::new(sensor, config.keypad.scan_policy)?;
//! let mut doorlock = Doorlock::new(reader, controller, &config);
//! doorlock.start()?;
//!
//! keys.type_keys("12347")?;
//! let dispatch = loop {
//!     if let Some(dispatch) = doorlock.tick().await? {
//!         break dispatch;
//!     }
//! };
//!
//! assert_eq!(dispatch.mode, LockState::Unlocking);
//! assert_eq!(doorlock.controller().state(), LockState::Locked);
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod buzzer;
pub mod controller;
pub mod doorlock;
pub mod error;
pub mod failure;
pub mod panic;
pub mod profile;
pub mod registry;
pub mod state;
pub mod tones;

pub use admin::{AdminEvent, AdminSession, AdminStep};
pub use buzzer::{BuzzerArbiter, Repeat, ToneSequence, ToneStep, ToneTask};
pub use controller::{Dispatch, ModeController};
pub use doorlock::Doorlock;
pub use error::{ControllerError, Result};
pub use failure::{FailureOutcome, FailureTracker};
pub use panic::{PanicActivation, PanicState};
pub use profile::{BlinkPattern, BlinkStyle, SpecialModeProfile};
pub use registry::{CodeRegistry, GuestCode, GuestStatus, Outcome, SpecialMode};
pub use state::{LockState, StateMachine, StateTransition};
