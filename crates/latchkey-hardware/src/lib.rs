//! Hardware abstraction layer for the latchkey door controller.
//!
//! This crate defines the collaborator interfaces the controller core talks
//! to: the keypad input channels, the indicator LEDs and door motor, and the
//! single buzzer output. Implementations are thin I/O wrappers; everything
//! with real semantics (edge detection, timing, mutual exclusion) lives in
//! the keypad and controller crates.
//!
//! # Design Philosophy
//!
//! - **Synchronous writes**: every operation is a single pin or PWM write, so
//!   the traits use plain `fn` with `&self`. Blocking and timing are the
//!   caller's job, done with `tokio::time`.
//! - **Object-safe**: the controller holds `Arc<dyn LockActuator>` and the
//!   buzzer arbiter owns a `Box<dyn ToneOutput>`.
//! - **Thread-safe**: all traits require `Send + Sync`, since tone sequences
//!   run on spawned Tokio tasks.
//! - **Error-aware**: all operations return [`Result<T>`][error::Result].
//!
//! # Device Traits
//!
//! ```
//! use latchkey_hardware::{ChannelSensor, Indicator, LockActuator, ToneOutput};
//! use latchkey_hardware::mock::{MockSensor, RecordingActuator};
//! use latchkey_core::KeyId;
//!
//! # fn main() -> latchkey_hardware::Result<()> {
//! let (sensor, handle) = MockSensor::new();
//! handle.press(KeyId::new(3).unwrap())?;
//! assert!(sensor.read_channels()?[2]);
//!
//! let actuator = RecordingActuator::new();
//! actuator.set_indicator(Indicator::Locked, true)?;
//! actuator.set_motor(false, 0)?;
//! actuator.set_tone(440, 50)?;
//! assert_eq!(actuator.log().len(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! # Implementations
//!
//! - [`mock`]: scripted sensor and recording actuator for tests.
//! - [`sim`]: tracing-backed devices for running the controller without GPIO.

pub mod error;
pub mod mock;
pub mod sim;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
pub use traits::{ChannelSensor, ChannelState, LockActuator, ToneOutput};
pub use types::{ActuatorEvent, DeviceInfo, Indicator};
