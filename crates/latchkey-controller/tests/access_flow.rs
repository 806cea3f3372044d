//! End-to-end tests for unlock, guest access and special modes, driven
//! through simulated key presses.

mod common;

use common::{CLEAR, harness, harness_with, quiet_config};
use latchkey_controller::{LockState, SpecialModeProfile};
use latchkey_core::Rejection;
use latchkey_hardware::{ActuatorEvent, Indicator};
use rstest::rstest;
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn test_secret_code_unlocks_and_relocks() {
    let mut h = harness();
    let start = Instant::now();

    let dispatch = h.submit("1234").await;

    assert_eq!(dispatch.mode, LockState::Unlocking);
    assert_eq!(dispatch.rejection, None);
    assert_eq!(h.doorlock.controller().state(), LockState::Locked);
    assert!(start.elapsed() >= Duration::from_secs(5));

    // Door opened, then returned to the locked appearance
    assert!(h.outputs.log().contains(&ActuatorEvent::Motor {
        enabled: true,
        speed: 80
    }));
    assert!(h.outputs.indicator(Indicator::Locked));
    assert!(!h.outputs.indicator(Indicator::Open));
    assert_eq!(h.outputs.motor(), (false, 0));
    assert_eq!(
        h.outputs.tone_frequencies(),
        vec![659, 622, 659, 622, 659]
    );
}

#[tokio::test(start_paused = true)]
async fn test_history_records_cycle() {
    let mut h = harness();
    h.submit("1234").await;

    let history = h.doorlock.controller().history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].from, LockState::Locked);
    assert_eq!(history[0].to, LockState::Unlocking);
    assert_eq!(history[1].to, LockState::Locked);
}

#[tokio::test(start_paused = true)]
async fn test_success_resets_failure_count() {
    let mut h = harness();
    h.submit("6666").await;
    h.submit("6666").await;
    assert_eq!(h.doorlock.controller().failure_count(), 2);

    h.submit("1234").await;
    assert_eq!(h.doorlock.controller().failure_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_extra_digits_are_dropped() {
    let mut h = harness();
    // Fifth and sixth digits never reach the buffer
    let dispatch = h.submit("123456").await;
    assert_eq!(dispatch.mode, LockState::Unlocking);
}

#[tokio::test(start_paused = true)]
async fn test_short_entry_is_unknown() {
    let mut h = harness();
    let dispatch = h.submit("123").await;
    assert_eq!(dispatch.rejection, Some(Rejection::UnknownCode));
    assert_eq!(h.doorlock.controller().failure_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_clear_discards_partial_entry() {
    let mut h = harness();
    h.keys.type_keys("66").unwrap();
    h.press(CLEAR);
    let dispatch = h.submit("1234").await;
    assert_eq!(dispatch.mode, LockState::Unlocking);
}

#[tokio::test(start_paused = true)]
async fn test_guest_code_is_single_use() {
    let mut h = harness();

    let first = h.submit("2424").await;
    assert_eq!(first.mode, LockState::GuestAccess);
    assert!(h.doorlock.controller().registry().guest().is_used());
    assert_eq!(h.outputs.tone_frequencies(), vec![523, 784]);

    let second = h.submit("2424").await;
    assert_eq!(second.mode, LockState::Failing);
    assert_eq!(second.rejection, Some(Rejection::GuestCodeReused));
    assert_eq!(h.doorlock.controller().failure_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_guest_code_expires() {
    let mut config = quiet_config();
    config.timing.guest_validity_ms = 1_000;
    let mut h = harness_with(config);

    tokio::time::advance(Duration::from_secs(2)).await;

    let dispatch = h.submit("2424").await;
    assert_eq!(dispatch.rejection, Some(Rejection::GuestCodeExpired));
    assert!(!h.doorlock.controller().registry().guest().is_used());
    assert_eq!(h.doorlock.controller().failure_count(), 1);
}

#[rstest]
#[case("1161", SpecialModeProfile::Ambulance)]
#[case("1151", SpecialModeProfile::Firefighter)]
#[case("1141", SpecialModeProfile::Burglar)]
#[case("1131", SpecialModeProfile::Trap)]
#[case("1261", SpecialModeProfile::Disco)]
#[case("1251", SpecialModeProfile::Stealth)]
#[tokio::test(start_paused = true)]
async fn test_special_modes_run_and_relock(
    #[case] code: &str,
    #[case] profile: SpecialModeProfile,
) {
    let mut h = harness();
    let start = Instant::now();

    let dispatch = h.submit(code).await;

    assert_eq!(dispatch.mode, LockState::SpecialMode(profile));
    assert_eq!(dispatch.rejection, None);
    assert!(start.elapsed() >= profile.duration());
    assert_eq!(h.doorlock.controller().state(), LockState::Locked);
    assert_eq!(h.doorlock.controller().failure_count(), 0);
    assert_eq!(h.outputs.motor(), (false, 0));
    assert!(h.outputs.is_silent());
    assert!(h.outputs.log().contains(&ActuatorEvent::Motor {
        enabled: true,
        speed: profile.motor_speed()
    }));
}
