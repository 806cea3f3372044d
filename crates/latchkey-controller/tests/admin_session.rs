//! Integration tests for the two-step secret code change.

mod common;

use common::{CLEAR, SUBMIT, harness};
use latchkey_controller::{AdminStep, LockState};
use latchkey_core::Rejection;

#[tokio::test(start_paused = true)]
async fn test_admin_trigger_opens_session() {
    let mut h = harness();
    let dispatch = h.submit("1515").await;

    assert_eq!(dispatch.mode, LockState::AdminAwaitingNew);
    assert_eq!(h.doorlock.controller().state(), LockState::AdminAwaitingNew);
    assert_eq!(h.doorlock.controller().admin_step(), AdminStep::AwaitingNew);
    // E4 G4 twice, with rests in between
    assert_eq!(h.outputs.tone_frequencies(), vec![330, 392, 330, 392]);
}

#[tokio::test(start_paused = true)]
async fn test_confirmed_change_replaces_secret() {
    let mut h = harness();
    h.submit("1515").await;

    let staged = h.submit("4321").await;
    assert_eq!(staged.rejection, None);
    assert_eq!(h.doorlock.controller().state(), LockState::AdminAwaitingConfirm);

    let confirmed = h.submit("4321").await;
    assert_eq!(confirmed.mode, LockState::AdminAwaitingConfirm);
    assert_eq!(confirmed.rejection, None);
    assert_eq!(h.doorlock.controller().state(), LockState::Locked);
    assert!(!h.doorlock.controller().is_admin_active());
    assert_eq!(h.doorlock.controller().registry().secret().as_str(), "4321");

    // The old secret is now an unknown code
    let old = h.submit("1234").await;
    assert_eq!(old.rejection, Some(Rejection::UnknownCode));

    let new = h.submit("4321").await;
    assert_eq!(new.mode, LockState::Unlocking);
}

#[tokio::test(start_paused = true)]
async fn test_mismatched_confirmation_keeps_secret() {
    let mut h = harness();
    h.submit("1515").await;
    h.submit("4321").await;

    let dispatch = h.submit("4322").await;
    assert_eq!(dispatch.rejection, Some(Rejection::AdminConfirmMismatch));
    assert_eq!(h.doorlock.controller().state(), LockState::Locked);
    assert_eq!(h.doorlock.controller().registry().secret().as_str(), "1234");
    // Admin rejections are not access failures
    assert_eq!(h.doorlock.controller().failure_count(), 0);

    let unlock = h.submit("1234").await;
    assert_eq!(unlock.mode, LockState::Unlocking);
}

#[tokio::test(start_paused = true)]
async fn test_short_new_code_aborts_session() {
    let mut h = harness();
    h.submit("1515").await;

    let dispatch = h.submit("43").await;
    assert_eq!(dispatch.mode, LockState::AdminAwaitingNew);
    assert_eq!(dispatch.rejection, Some(Rejection::InvalidAdminFormat));
    assert_eq!(h.doorlock.controller().state(), LockState::Locked);
    assert!(!h.doorlock.controller().is_admin_active());
}

#[tokio::test(start_paused = true)]
async fn test_clear_aborts_without_commit() {
    let mut h = harness();
    h.submit("1515").await;
    h.submit("4321").await;

    h.keys.type_keys("43").unwrap();
    h.press(CLEAR);
    let dispatch = h.next_dispatch().await;

    assert_eq!(dispatch.mode, LockState::AdminAwaitingConfirm);
    assert_eq!(dispatch.rejection, None);
    assert_eq!(h.doorlock.controller().state(), LockState::Locked);
    assert_eq!(h.doorlock.controller().admin_step(), AdminStep::Inactive);
    assert!(h.doorlock.buffer().is_empty());
    assert_eq!(h.doorlock.controller().registry().secret().as_str(), "1234");
}

#[tokio::test(start_paused = true)]
async fn test_special_codes_are_plain_input_during_session() {
    let mut h = harness();
    h.submit("1515").await;

    // The panic trigger is staged as the new code, not dispatched
    let dispatch = h.submit("1125").await;
    assert_eq!(dispatch.mode, LockState::AdminAwaitingNew);
    assert_eq!(h.doorlock.controller().state(), LockState::AdminAwaitingConfirm);
    assert!(!h.doorlock.controller().panic_state().is_active());

    h.keys.type_keys("6").unwrap();
    h.press(SUBMIT);
    let dispatch = h.next_dispatch().await;
    assert_eq!(dispatch.rejection, Some(Rejection::AdminConfirmMismatch));
}
