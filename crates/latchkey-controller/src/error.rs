//! Error types for the controller.
//!
//! Access rejections (wrong code, admin mismatch, ...) are not errors; they
//! are reported as [`Rejection`](latchkey_core::Rejection) values inside a
//! [`Dispatch`](crate::Dispatch). Everything here is a fault the controller
//! cannot recover from by returning to the locked state.

use latchkey_hardware::HardwareError;
use thiserror::Error;

/// Result type alias for controller operations.
pub type Result<T> = std::result::Result<T, ControllerError>;

#[derive(Error, Debug)]
pub enum ControllerError {
    /// An actuator, sensor or buzzer write failed.
    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    /// Domain error, e.g. an illegal state transition.
    #[error(transparent)]
    Core(#[from] latchkey_core::Error),

    /// A spawned tone task panicked or was cancelled before it was joined.
    #[error("Tone task '{name}' did not complete: {reason}")]
    ToneTask { name: &'static str, reason: String },
}

impl ControllerError {
    /// Returns `true` if the error came from a device.
    pub fn is_hardware(&self) -> bool {
        matches!(self, ControllerError::Hardware(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hardware_conversion() {
        let err: ControllerError = HardwareError::disconnected("Keypad").into();
        assert!(err.is_hardware());
        assert_eq!(err.to_string(), "Hardware error: Device disconnected: Keypad");
    }

    #[test]
    fn test_tone_task_display() {
        let err = ControllerError::ToneTask {
            name: "fur_elise",
            reason: "task panicked".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Tone task 'fur_elise' did not complete: task panicked"
        );
        assert!(!err.is_hardware());
    }
}
