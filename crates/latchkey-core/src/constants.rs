//! Core constants for the latchkey door controller.
//!
//! This module defines the keypad layout, the code alphabet, the factory
//! default codes and the default timing of every actuator sequence. Runtime
//! values come from [`LockConfig`](crate::config::LockConfig), whose defaults
//! are taken from here.
//!
//! # Keypad Layout
//!
//! The keypad is a row of eight independent push buttons wired to fixed
//! digital input channels. Channel index `i` reports key id `i + 1`:
//!
//! | Key id | Role |
//! |--------|------|
//! | 1-6 | Digits `'1'`-`'6'` |
//! | 7 | Submit |
//! | 8 | Clear |
//!
//! Because keys 7 and 8 are reserved, no code may contain those digits.
//!
//! # Usage
//!
//! ```
//! use latchkey_core::constants::*;
//! use std::time::Duration;
//!
//! assert_eq!(CODE_LENGTH, 4);
//! assert!(CODE_ALPHABET.contains(&'6'));
//! assert!(!CODE_ALPHABET.contains(&'7'));
//!
//! let lockdown = Duration::from_millis(DEFAULT_LOCKDOWN_DURATION_MS);
//! assert_eq!(lockdown.as_secs(), 60);
//! ```

// ============================================================================
// Keypad Layout
// ============================================================================

/// Number of keypad input channels.
pub const CHANNEL_COUNT: usize = 8;

/// Key id of the submit key.
pub const KEY_SUBMIT: u8 = 7;

/// Key id of the clear key.
pub const KEY_CLEAR: u8 = 8;

/// Highest key id that enters a digit.
pub const MAX_DIGIT_KEY: u8 = 6;

// ============================================================================
// Codes
// ============================================================================

/// Exact length of every code.
pub const CODE_LENGTH: usize = 4;

/// Characters a code may contain.
///
/// Digits 7 and 8 are excluded since those keys submit and clear.
pub const CODE_ALPHABET: [char; 6] = ['1', '2', '3', '4', '5', '6'];

/// Factory secret code. Replaced only by a committed admin change.
pub const DEFAULT_SECRET_CODE: &str = "1234";

/// One-time guest code.
pub const DEFAULT_GUEST_CODE: &str = "2424";

/// Code that opens the admin code-change session.
pub const DEFAULT_ADMIN_CODE: &str = "1515";

/// Code that starts the silent panic sequence.
pub const DEFAULT_PANIC_CODE: &str = "1125";

/// Ambulance call trigger.
pub const DEFAULT_AMBULANCE_CODE: &str = "1161";

/// Firefighter call trigger.
pub const DEFAULT_FIREFIGHTER_CODE: &str = "1151";

/// Burglar warning trigger.
pub const DEFAULT_BURGLAR_CODE: &str = "1141";

/// Trap warning trigger.
pub const DEFAULT_TRAP_CODE: &str = "1131";

/// Disco party trigger.
pub const DEFAULT_DISCO_CODE: &str = "1261";

/// Stealth mode trigger.
pub const DEFAULT_STEALTH_CODE: &str = "1251";

// ============================================================================
// Unlock Timing
// ============================================================================

/// Total time the door stays unlocked after a successful code (milliseconds).
///
/// Covers the blink window plus the steady "open" hold that follows it.
///
/// # Value: 5000ms
pub const DEFAULT_LOCK_DURATION_MS: u64 = 5_000;

/// Duration of the open-indicator blink window while the motor runs (milliseconds).
///
/// # Value: 2000ms
pub const DEFAULT_UNLOCK_BLINK_MS: u64 = 2_000;

/// Motor speed used when opening the door (percent).
pub const NOMINAL_MOTOR_SPEED: u8 = 80;

// ============================================================================
// Failure and Lockdown
// ============================================================================

/// Consecutive unknown-code submissions that trigger lockdown.
pub const DEFAULT_FAILURE_LIMIT: u32 = 5;

/// How long keypad input is ignored once lockdown triggers (milliseconds).
///
/// # Value: 60000ms (1 minute)
pub const DEFAULT_LOCKDOWN_DURATION_MS: u64 = 60_000;

// ============================================================================
// Panic and Guest
// ============================================================================

/// Total duration of the silent panic sequence (milliseconds).
///
/// # Value: 60000ms
pub const DEFAULT_PANIC_DURATION_MS: u64 = 60_000;

/// Portion of the panic sequence during which the quiet pulse plays (milliseconds).
///
/// Must not exceed [`DEFAULT_PANIC_DURATION_MS`].
///
/// # Value: 30000ms
pub const DEFAULT_PANIC_PULSE_MS: u64 = 30_000;

/// How long the guest code stays valid after startup (milliseconds).
///
/// A value of 0 disables expiry; the code is then limited only by its
/// one-time use flag.
///
/// # Value: 43200000ms (12 hours)
pub const DEFAULT_GUEST_VALIDITY_MS: u64 = 12 * 3_600 * 1_000;

// ============================================================================
// Scheduling
// ============================================================================

/// Main loop sleep between keypad polls (milliseconds).
///
/// Bounds keypad latency. Must exceed the mechanical bounce time of the
/// buttons since there is no debounce beyond edge detection.
pub const DEFAULT_TICK_MS: u64 = 10;

/// Main loop sleep while lockdown is active (milliseconds).
pub const DEFAULT_LOCKDOWN_TICK_MS: u64 = 100;

// ============================================================================
// Tone Output
// ============================================================================

/// Duty cycle used for audible tones (percent).
pub const TONE_DUTY: u8 = 50;

/// Base note length; melody entries are multiples of this (milliseconds).
pub const NOTE_UNIT_MS: u64 = 200;
