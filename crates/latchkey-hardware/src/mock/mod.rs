//! Mock device implementations for testing and development.
//!
//! This module provides simulated devices that can be controlled and
//! inspected programmatically without requiring physical hardware.

pub mod actuator;
pub mod sensor;

// Re-export commonly used types
pub use actuator::{FailingActuator, RecordedEvent, RecordingActuator};
pub use sensor::{MockSensor, MockSensorHandle};
