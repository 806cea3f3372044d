//! Mock keypad sensor for testing and development.
//!
//! The sensor replays channel snapshots queued through a
//! [`MockSensorHandle`]. Each call to `read_channels` consumes one queued
//! snapshot; once the queue is empty the last snapshot is repeated, like a
//! real input that holds its level between polls.

use crate::{
    HardwareError, Result,
    traits::{ChannelSensor, ChannelState},
    types::DeviceInfo,
};
use latchkey_core::{KeyId, constants::CHANNEL_COUNT};
use std::sync::Mutex;
use tokio::sync::mpsc::{self, error::TryRecvError};

/// Mock keypad input channels.
///
/// # Examples
///
/// ```
/// use latchkey_hardware::ChannelSensor;
/// use latchkey_hardware::mock::MockSensor;
/// use latchkey_core::KeyId;
///
/// # fn main() -> latchkey_hardware::Result<()> {
/// let (sensor, handle) = MockSensor::new();
///
/// // A press is one HIGH snapshot followed by a release
/// handle.press(KeyId::new(7).unwrap())?;
///
/// assert!(sensor.read_channels()?[6]);
/// assert!(!sensor.read_channels()?[6]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MockSensor {
    /// Channel receiver for queued snapshots
    frames_rx: Mutex<mpsc::UnboundedReceiver<ChannelState>>,

    /// Level reported when no snapshot is queued
    last: Mutex<ChannelState>,

    /// Device name
    name: String,
}

impl MockSensor {
    /// Create a new mock sensor with the default name.
    ///
    /// Returns the sensor and a handle used to queue input.
    pub fn new() -> (Self, MockSensorHandle) {
        Self::with_name("Mock Sensor".to_string())
    }

    /// Create a new mock sensor with a custom name.
    pub fn with_name(name: String) -> (Self, MockSensorHandle) {
        let (frames_tx, frames_rx) = mpsc::unbounded_channel();

        let sensor = Self {
            frames_rx: Mutex::new(frames_rx),
            last: Mutex::new([false; CHANNEL_COUNT]),
            name,
        };

        (sensor, MockSensorHandle { frames_tx })
    }
}

impl ChannelSensor for MockSensor {
    fn read_channels(&self) -> Result<ChannelState> {
        let mut rx = self
            .frames_rx
            .lock()
            .map_err(|_| HardwareError::other("sensor queue poisoned"))?;
        let mut last = self
            .last
            .lock()
            .map_err(|_| HardwareError::other("sensor state poisoned"))?;

        match rx.try_recv() {
            Ok(frame) => {
                *last = frame;
                Ok(frame)
            }
            Err(TryRecvError::Empty) => Ok(*last),
            Err(TryRecvError::Disconnected) => Err(HardwareError::disconnected(&self.name)),
        }
    }

    fn discard_pending(&self) -> Result<usize> {
        let mut rx = self
            .frames_rx
            .lock()
            .map_err(|_| HardwareError::other("sensor queue poisoned"))?;
        let mut last = self
            .last
            .lock()
            .map_err(|_| HardwareError::other("sensor state poisoned"))?;

        // The held level follows the newest dropped snapshot
        let mut dropped = 0;
        while let Ok(frame) = rx.try_recv() {
            *last = frame;
            dropped += 1;
        }
        Ok(dropped)
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new(self.name.clone(), "Mock Sensor v1.0").with_firmware_version("1.0.0")
    }
}

/// Handle for queueing input to a mock sensor.
///
/// It can be cloned and shared across tasks. Once every handle is dropped and
/// the queue is drained, the sensor reports itself disconnected.
#[derive(Debug, Clone)]
pub struct MockSensorHandle {
    /// Channel sender for snapshots
    frames_tx: mpsc::UnboundedSender<ChannelState>,
}

impl MockSensorHandle {
    /// Queue a raw channel snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the sensor has been dropped.
    pub fn send_frame(&self, frame: ChannelState) -> Result<()> {
        self.frames_tx
            .send(frame)
            .map_err(|_| HardwareError::disconnected("Sensor input channel closed"))
    }

    /// Queue a press and release of one key.
    ///
    /// # Errors
    ///
    /// Returns an error if the sensor has been dropped.
    pub fn press(&self, key: KeyId) -> Result<()> {
        self.press_together(&[key])
    }

    /// Queue several keys rising within the same poll, then a release.
    ///
    /// # Errors
    ///
    /// Returns an error if the sensor has been dropped.
    pub fn press_together(&self, keys: &[KeyId]) -> Result<()> {
        let mut frame = [false; CHANNEL_COUNT];
        for key in keys {
            frame[key.channel()] = true;
        }
        self.send_frame(frame)?;
        self.release()
    }

    /// Queue an all-low snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the sensor has been dropped.
    pub fn release(&self) -> Result<()> {
        self.send_frame([false; CHANNEL_COUNT])
    }

    /// Queue a press of each key id in `digits`, e.g. `"12347"`.
    ///
    /// # Errors
    ///
    /// Returns an error if a character is not a valid key id or the sensor
    /// has been dropped.
    pub fn type_keys(&self, digits: &str) -> Result<()> {
        for c in digits.chars() {
            let id = c
                .to_digit(10)
                .and_then(|d| u8::try_from(d).ok())
                .ok_or_else(|| HardwareError::invalid_data(format!("not a key id: '{c}'")))?;
            self.press(KeyId::new(id)?)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: u8) -> KeyId {
        KeyId::new(id).unwrap()
    }

    #[test]
    fn test_idle_sensor_reads_low() {
        let (sensor, _handle) = MockSensor::new();
        assert_eq!(sensor.read_channels().unwrap(), [false; CHANNEL_COUNT]);
    }

    #[test]
    fn test_press_is_high_then_low() {
        let (sensor, handle) = MockSensor::new();
        handle.press(key(2)).unwrap();

        let pressed = sensor.read_channels().unwrap();
        assert!(pressed[1]);
        assert_eq!(pressed.iter().filter(|&&h| h).count(), 1);

        assert_eq!(sensor.read_channels().unwrap(), [false; CHANNEL_COUNT]);
    }

    #[test]
    fn test_last_frame_is_held() {
        let (sensor, handle) = MockSensor::new();
        let mut frame = [false; CHANNEL_COUNT];
        frame[4] = true;
        handle.send_frame(frame).unwrap();

        assert_eq!(sensor.read_channels().unwrap(), frame);
        assert_eq!(sensor.read_channels().unwrap(), frame);
    }

    #[test]
    fn test_type_keys() {
        let (sensor, handle) = MockSensor::new();
        handle.type_keys("17").unwrap();

        assert!(sensor.read_channels().unwrap()[0]);
        assert!(!sensor.read_channels().unwrap()[0]);
        assert!(sensor.read_channels().unwrap()[6]);
    }

    #[test]
    fn test_type_keys_rejects_invalid() {
        let (_sensor, handle) = MockSensor::new();
        assert!(handle.type_keys("9").is_err());
        assert!(handle.type_keys("x").is_err());
    }

    #[test]
    fn test_disconnected_after_handles_dropped() {
        let (sensor, handle) = MockSensor::new();
        handle.press(key(1)).unwrap();
        drop(handle);

        // Queued frames are still delivered
        assert!(sensor.read_channels().unwrap()[0]);
        assert!(sensor.read_channels().is_ok());

        let result = sensor.read_channels();
        assert!(matches!(result, Err(HardwareError::Disconnected { .. })));
    }

    #[test]
    fn test_discard_pending_drops_queue_and_keeps_level() {
        let (sensor, handle) = MockSensor::new();
        handle.type_keys("12").unwrap();
        let mut held = [false; CHANNEL_COUNT];
        held[3] = true;
        handle.send_frame(held).unwrap();

        assert_eq!(sensor.discard_pending().unwrap(), 5);
        assert_eq!(sensor.read_channels().unwrap(), held);
        assert_eq!(sensor.discard_pending().unwrap(), 0);
    }

    #[test]
    fn test_info() {
        let (sensor, _handle) = MockSensor::with_name("Door Keypad".to_string());
        let info = sensor.info();
        assert_eq!(info.name, "Door Keypad");
        assert_eq!(info.model, "Mock Sensor v1.0");
    }
}
