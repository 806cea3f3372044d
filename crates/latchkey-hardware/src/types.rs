//! Common types shared across hardware device implementations.

use serde::{Deserialize, Serialize};

/// Generic device information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "MockSensor").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional firmware version string.
    pub firmware_version: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            firmware_version: None,
        }
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}

/// The two binary feedback LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    /// Red LED, lit while the door is locked.
    Locked,

    /// Green LED, lit while the door is open.
    Open,
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Locked => write!(f, "locked"),
            Self::Open => write!(f, "open"),
        }
    }
}

/// A single actuator write, as recorded by the mock devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActuatorEvent {
    Indicator { which: Indicator, on: bool },
    Motor { enabled: bool, speed: u8 },
    Tone { freq_hz: u32, duty: u8 },
}

impl ActuatorEvent {
    /// Returns `true` if this write silences the buzzer.
    #[must_use]
    pub fn is_silence(&self) -> bool {
        matches!(self, Self::Tone { duty: 0, .. })
    }

    /// Returns `true` for buzzer writes.
    #[must_use]
    pub fn is_tone(&self) -> bool {
        matches!(self, Self::Tone { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_info_builder() {
        let info = DeviceInfo::new("Sensor", "GPIO x8").with_firmware_version("1.0.0");
        assert_eq!(info.name, "Sensor");
        assert_eq!(info.firmware_version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_event_serialization() {
        let event = ActuatorEvent::Indicator {
            which: Indicator::Open,
            on: true,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"kind":"indicator","which":"open","on":true}"#);
    }

    #[test]
    fn test_silence_detection() {
        assert!(ActuatorEvent::Tone { freq_hz: 0, duty: 0 }.is_silence());
        assert!(!ActuatorEvent::Tone { freq_hz: 440, duty: 50 }.is_silence());
        assert!(!ActuatorEvent::Motor { enabled: false, speed: 0 }.is_silence());
    }
}
