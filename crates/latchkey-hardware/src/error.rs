//! Error types for hardware operations.
//!
//! Hardware failures are fatal for the controller: they propagate out of the
//! main loop and are caught only at the process boundary, where all outputs
//! are switched off before exiting.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Invalid value passed to or received from a device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<latchkey_core::Error> for HardwareError {
    fn from(error: latchkey_core::Error) -> Self {
        Self::invalid_data(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("keypad");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: keypad");
    }

    #[test]
    fn test_invalid_data_error() {
        let error = HardwareError::invalid_data("motor speed 120 out of range");
        assert_eq!(
            error.to_string(),
            "Invalid data: motor speed 120 out of range"
        );
    }

    #[test]
    fn test_from_core_error() {
        let error: HardwareError = latchkey_core::Error::InvalidKeyId(9).into();
        assert!(matches!(error, HardwareError::InvalidData { .. }));
    }
}
