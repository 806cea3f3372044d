//! Simulated devices that log every write through `tracing`.
//!
//! Used by the `latchkey` binary to run the full controller on a machine
//! without GPIO. Indicator and motor writes are logged at `info`, tone
//! writes at `debug` since melodies produce many of them.

use crate::{
    Result,
    traits::{LockActuator, ToneOutput, check_percent},
    types::{DeviceInfo, Indicator},
};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use tracing::{debug, info};

/// Indicator LEDs and motor that log instead of driving pins.
#[derive(Debug, Default)]
pub struct TracingActuator {
    locked: AtomicBool,
    open: AtomicBool,
    motor_speed: AtomicU8,
}

impl TracingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, which: Indicator) -> &AtomicBool {
        match which {
            Indicator::Locked => &self.locked,
            Indicator::Open => &self.open,
        }
    }

    /// Current level of an indicator.
    pub fn indicator(&self, which: Indicator) -> bool {
        self.slot(which).load(Ordering::Relaxed)
    }

    /// Current motor speed (0 when disabled).
    pub fn motor_speed(&self) -> u8 {
        self.motor_speed.load(Ordering::Relaxed)
    }
}

impl LockActuator for TracingActuator {
    fn set_indicator(&self, which: Indicator, on: bool) -> Result<()> {
        // Blink loops rewrite the same level often; only log changes.
        if self.slot(which).swap(on, Ordering::Relaxed) != on {
            info!(indicator = %which, on, "indicator");
        }
        Ok(())
    }

    fn set_motor(&self, enabled: bool, speed: u8) -> Result<()> {
        check_percent("motor speed", speed)?;
        let effective = if enabled { speed } else { 0 };
        if self.motor_speed.swap(effective, Ordering::Relaxed) != effective {
            info!(enabled, speed, "motor");
        }
        Ok(())
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new("Simulated Actuator", "tracing")
    }
}

/// Buzzer that logs instead of driving PWM.
#[derive(Debug, Default)]
pub struct TracingTone;

impl TracingTone {
    pub fn new() -> Self {
        Self
    }
}

impl ToneOutput for TracingTone {
    fn set_tone(&self, freq_hz: u32, duty: u8) -> Result<()> {
        check_percent("duty", duty)?;
        if duty == 0 {
            debug!("tone off");
        } else {
            debug!(freq_hz, duty, "tone");
        }
        Ok(())
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new("Simulated Buzzer", "tracing")
    }
}
