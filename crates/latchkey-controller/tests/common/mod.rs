//! Shared harness for the controller integration tests.
//!
//! A [`Harness`] wires a [`Doorlock`] to a [`MockSensor`] and a
//! [`RecordingActuator`] that doubles as the buzzer output, so every LED,
//! motor and tone write lands in one time-stamped log.
//!
//! All tests run on a paused tokio clock; the mode sequences take their full
//! virtual duration but finish instantly.

#![allow(dead_code)]

use latchkey_controller::{BuzzerArbiter, Dispatch, Doorlock, ModeController, PanicState};
use latchkey_core::{KeyId, LockConfig};
use latchkey_hardware::mock::{MockSensor, MockSensorHandle, RecordingActuator};
use latchkey_keypad::KeypadReader;
use std::sync::Arc;

pub const SUBMIT: u8 = 7;
pub const CLEAR: u8 = 8;

/// Upper bound on ticks spent waiting for a dispatch, so a routing bug fails
/// the test instead of hanging it.
const MAX_TICKS: usize = 10_000;

pub struct Harness {
    pub doorlock: Doorlock<MockSensor>,
    pub keys: MockSensorHandle,
    pub outputs: RecordingActuator,
}

/// Defaults with key clicks off, so tone assertions see only mode tones.
pub fn quiet_config() -> LockConfig {
    let mut config = LockConfig::default();
    config.keypad.key_feedback = false;
    config
}

pub fn harness() -> Harness {
    harness_with(quiet_config())
}

pub fn harness_with(config: LockConfig) -> Harness {
    build(config, PanicState::new())
}

/// Harness whose controller shares `panic` with the test.
pub fn harness_with_panic(panic: PanicState) -> Harness {
    build(quiet_config(), panic)
}

fn build(config: LockConfig, panic: PanicState) -> Harness {
    let (sensor, keys) = MockSensor::new();
    let outputs = RecordingActuator::new();

    let controller = ModeController::new(
        &config,
        Arc::new(outputs.clone()),
        BuzzerArbiter::new(outputs.clone()),
    )
    .with_panic_state(panic);
    let reader = KeypadReader::new(sensor, config.keypad.scan_policy).unwrap();

    let mut doorlock = Doorlock::new(reader, controller, &config);
    doorlock.start().unwrap();

    Harness {
        doorlock,
        keys,
        outputs,
    }
}

impl Harness {
    /// Type `digits`, press submit and tick until the entry is dispatched.
    pub async fn submit(&mut self, digits: &str) -> Dispatch {
        self.keys.type_keys(digits).unwrap();
        self.press(SUBMIT);
        self.next_dispatch().await
    }

    /// Queue a press and release of key `id`.
    pub fn press(&self, id: u8) {
        self.keys.press(KeyId::new(id).unwrap()).unwrap();
    }

    pub async fn next_dispatch(&mut self) -> Dispatch {
        for _ in 0..MAX_TICKS {
            if let Some(dispatch) = self.doorlock.tick().await.unwrap() {
                return dispatch;
            }
        }
        panic!("no dispatch after {MAX_TICKS} ticks");
    }

    /// Run `count` ticks, asserting that none of them dispatched.
    pub async fn idle_ticks(&mut self, count: usize) {
        for _ in 0..count {
            assert_eq!(self.doorlock.tick().await.unwrap(), None);
        }
    }
}
