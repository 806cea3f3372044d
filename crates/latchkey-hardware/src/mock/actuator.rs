//! Recording actuator for testing.
//!
//! [`RecordingActuator`] implements both [`LockActuator`] and [`ToneOutput`]
//! and appends every write, with its (virtual) timestamp, to a shared log.
//! Clones share the log, so one clone can be handed to the controller and
//! another to the buzzer arbiter while the test inspects a third.

use crate::{
    HardwareError, Result,
    traits::{LockActuator, ToneOutput, check_percent},
    types::{ActuatorEvent, DeviceInfo, Indicator},
};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::Instant;

/// One logged write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedEvent {
    /// When the write happened (Tokio clock, so paused tests see virtual time).
    pub at: Instant,

    /// What was written.
    pub event: ActuatorEvent,
}

/// Mock actuator that records every write.
///
/// # Examples
///
/// ```
/// use latchkey_hardware::{ActuatorEvent, Indicator, LockActuator};
/// use latchkey_hardware::mock::RecordingActuator;
///
/// # fn main() -> latchkey_hardware::Result<()> {
/// let actuator = RecordingActuator::new();
/// let shared = actuator.clone();
///
/// shared.set_indicator(Indicator::Open, true)?;
///
/// assert_eq!(
///     actuator.log(),
///     vec![ActuatorEvent::Indicator { which: Indicator::Open, on: true }]
/// );
/// assert!(actuator.indicator(Indicator::Open));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingActuator {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingActuator {
    /// Create a recorder with an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<RecordedEvent>> {
        // A panic while holding the lock only happens inside a failing test.
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn record(&self, event: ActuatorEvent) {
        self.entries().push(RecordedEvent {
            at: Instant::now(),
            event,
        });
    }

    /// All writes so far, without timestamps.
    pub fn log(&self) -> Vec<ActuatorEvent> {
        self.entries().iter().map(|r| r.event).collect()
    }

    /// All writes so far, with timestamps.
    pub fn recorded(&self) -> Vec<RecordedEvent> {
        self.entries().clone()
    }

    /// Buzzer writes only.
    pub fn tone_log(&self) -> Vec<ActuatorEvent> {
        self.log().into_iter().filter(ActuatorEvent::is_tone).collect()
    }

    /// Frequencies of audible buzzer writes, in order.
    pub fn tone_frequencies(&self) -> Vec<u32> {
        self.log()
            .into_iter()
            .filter_map(|e| match e {
                ActuatorEvent::Tone { freq_hz, duty } if duty > 0 => Some(freq_hz),
                _ => None,
            })
            .collect()
    }

    /// Number of writes so far.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Forget all recorded writes.
    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Last written level of an indicator (`false` if never written).
    pub fn indicator(&self, which: Indicator) -> bool {
        self.entries()
            .iter()
            .rev()
            .find_map(|r| match r.event {
                ActuatorEvent::Indicator { which: w, on } if w == which => Some(on),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Last written motor state (`(false, 0)` if never written).
    pub fn motor(&self) -> (bool, u8) {
        self.entries()
            .iter()
            .rev()
            .find_map(|r| match r.event {
                ActuatorEvent::Motor { enabled, speed } => Some((enabled, speed)),
                _ => None,
            })
            .unwrap_or((false, 0))
    }

    /// Returns `true` if the last buzzer write was silence (or none happened).
    pub fn is_silent(&self) -> bool {
        self.entries()
            .iter()
            .rev()
            .find(|r| r.event.is_tone())
            .is_none_or(|r| r.event.is_silence())
    }
}

impl LockActuator for RecordingActuator {
    fn set_indicator(&self, which: Indicator, on: bool) -> Result<()> {
        self.record(ActuatorEvent::Indicator { which, on });
        Ok(())
    }

    fn set_motor(&self, enabled: bool, speed: u8) -> Result<()> {
        check_percent("motor speed", speed)?;
        self.record(ActuatorEvent::Motor { enabled, speed });
        Ok(())
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new("Recording Actuator", "Mock Actuator v1.0")
    }
}

impl ToneOutput for RecordingActuator {
    fn set_tone(&self, freq_hz: u32, duty: u8) -> Result<()> {
        check_percent("duty", duty)?;
        self.record(ActuatorEvent::Tone { freq_hz, duty });
        Ok(())
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new("Recording Buzzer", "Mock Buzzer v1.0")
    }
}

/// Actuator whose every write fails, for exercising error propagation.
#[derive(Debug, Clone, Default)]
pub struct FailingActuator;

impl LockActuator for FailingActuator {
    fn set_indicator(&self, _which: Indicator, _on: bool) -> Result<()> {
        Err(HardwareError::communication("indicator write failed"))
    }

    fn set_motor(&self, _enabled: bool, _speed: u8) -> Result<()> {
        Err(HardwareError::communication("motor write failed"))
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new("Failing Actuator", "Mock Actuator v1.0")
    }
}
