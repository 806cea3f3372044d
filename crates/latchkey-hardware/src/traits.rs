//! Hardware device trait definitions.
//!
//! These traits establish the contract between the controller core and the
//! door's peripherals, enabling easy substitution between mock, simulated and
//! real GPIO implementations.

use crate::error::{HardwareError, Result};
use crate::types::{DeviceInfo, Indicator};
use latchkey_core::constants::CHANNEL_COUNT;

/// Raw level of every keypad input channel; index 0 is key id 1.
pub type ChannelState = [bool; CHANNEL_COUNT];

/// Keypad input channels.
///
/// A reading is a snapshot of all channel levels (`true` = HIGH = pressed).
/// Edge detection is done by the caller; implementations report levels only.
///
/// # Examples
///
/// ```
/// use latchkey_hardware::ChannelSensor;
/// use latchkey_hardware::mock::MockSensor;
///
/// # fn main() -> latchkey_hardware::Result<()> {
/// let (sensor, _handle) = MockSensor::new();
/// assert_eq!(sensor.read_channels()?, [false; 8]);
/// # Ok(())
/// # }
/// ```
pub trait ChannelSensor: Send + Sync {
    /// Read the current level of all channels.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected or a read fails.
    fn read_channels(&self) -> Result<ChannelState>;

    /// Drop any input the device has buffered but not yet reported, and
    /// return how many snapshots were dropped.
    ///
    /// Level-sampled inputs hold no backlog, so the default does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the device state cannot be accessed.
    fn discard_pending(&self) -> Result<usize> {
        Ok(0)
    }

    /// Get device information.
    fn info(&self) -> DeviceInfo;
}

/// Indicator LEDs and the door motor.
///
/// The two indicators are independent; they may both be off during
/// transitions or both on in some alert patterns.
pub trait LockActuator: Send + Sync {
    /// Switch one indicator LED.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set_indicator(&self, which: Indicator, on: bool) -> Result<()>;

    /// Set the motor enable line and PWM speed (0-100).
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InvalidData` if `speed > 100`, or an error if
    /// the write fails.
    fn set_motor(&self, enabled: bool, speed: u8) -> Result<()>;

    /// Get device information.
    fn info(&self) -> DeviceInfo;

    /// Switch every output off. Used at process teardown.
    ///
    /// # Errors
    ///
    /// Returns the first write error encountered.
    fn all_off(&self) -> Result<()> {
        self.set_motor(false, 0)?;
        self.set_indicator(Indicator::Locked, false)?;
        self.set_indicator(Indicator::Open, false)
    }
}

/// The buzzer's frequency and duty PWM channel.
///
/// There is exactly one such output per door, and it must only be driven
/// through the controller's buzzer arbiter.
pub trait ToneOutput: Send + Sync {
    /// Set frequency (Hz) and duty cycle (0-100). Duty 0 is silence.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InvalidData` if `duty > 100`, or an error if
    /// the write fails.
    fn set_tone(&self, freq_hz: u32, duty: u8) -> Result<()>;

    /// Get device information.
    fn info(&self) -> DeviceInfo;

    /// Silence the output.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn silence(&self) -> Result<()> {
        self.set_tone(0, 0)
    }
}

/// Check a PWM percentage argument.
///
/// # Errors
///
/// Returns `HardwareError::InvalidData` if `value > 100`.
pub fn check_percent(what: &str, value: u8) -> Result<()> {
    if value > 100 {
        return Err(HardwareError::invalid_data(format!(
            "{what} must be 0-100, got {value}"
        )));
    }
    Ok(())
}
