//! Runtime configuration for the door controller.
//!
//! Every field has a default taken from [`constants`](crate::constants), so an
//! empty TOML document is a valid configuration:
//!
//! ```
//! use latchkey_core::LockConfig;
//!
//! let config = LockConfig::from_toml_str("").unwrap();
//! assert_eq!(config.codes.secret.as_str(), "1234");
//! ```
//!
//! Partial documents override only what they name:
//!
//! ```
//! use latchkey_core::{LockConfig, ScanPolicy};
//!
//! let config = LockConfig::from_toml_str(r#"
//!     [codes]
//!     secret = "4321"
//!
//!     [timing]
//!     failure_limit = 3
//!
//!     [keypad]
//!     scan_policy = "last_in_scan_order"
//! "#).unwrap();
//!
//! assert_eq!(config.codes.secret.as_str(), "4321");
//! assert_eq!(config.timing.failure_limit, 3);
//! assert_eq!(config.keypad.scan_policy, ScanPolicy::LastInScanOrder);
//! ```

use crate::{Code, Result, constants::*, error::Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Secret, guest, admin, panic and special-mode trigger codes.
    pub codes: CodeConfig,

    /// Durations and thresholds.
    pub timing: TimingConfig,

    /// Keypad scanning behaviour.
    pub keypad: KeypadConfig,
}

impl LockConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    /// Returns `Error::ConfigParse` for malformed TOML or invalid codes and
    /// `Error::Config` if validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: LockConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check cross-field invariants.
    ///
    /// # Errors
    /// Returns `Error::Config` if:
    /// - Two trigger codes are equal (classification would be ambiguous)
    /// - The failure limit is zero
    /// - The unlock blink window exceeds the lock duration
    /// - The panic pulse outlasts the panic sequence
    /// - The lock, lockdown or panic duration is zero
    /// - A tick interval is zero
    pub fn validate(&self) -> Result<()> {
        let triggers = self.codes.triggers();
        for (i, (name_a, code_a)) in triggers.iter().enumerate() {
            for (name_b, code_b) in &triggers[i + 1..] {
                if code_a == code_b {
                    return Err(Error::Config(format!(
                        "{name_a} and {name_b} codes must differ"
                    )));
                }
            }
        }

        let timing = &self.timing;
        if timing.failure_limit == 0 {
            return Err(Error::Config("failure_limit must be at least 1".into()));
        }
        for (name, value) in [
            ("lock_duration_ms", timing.lock_duration_ms),
            ("lockdown_duration_ms", timing.lockdown_duration_ms),
            ("panic_duration_ms", timing.panic_duration_ms),
        ] {
            if value == 0 {
                return Err(Error::Config(format!("{name} must be non-zero")));
            }
        }
        if timing.unlock_blink_ms > timing.lock_duration_ms {
            return Err(Error::Config(
                "unlock_blink_ms must not exceed lock_duration_ms".into(),
            ));
        }
        if timing.panic_pulse_ms > timing.panic_duration_ms {
            return Err(Error::Config(
                "panic_pulse_ms must not exceed panic_duration_ms".into(),
            ));
        }
        if timing.lockdown_alarm_ms.unwrap_or(0) > timing.lockdown_duration_ms {
            return Err(Error::Config(
                "lockdown_alarm_ms must not exceed lockdown_duration_ms".into(),
            ));
        }
        if timing.tick_ms == 0 || timing.lockdown_tick_ms == 0 {
            return Err(Error::Config("tick intervals must be non-zero".into()));
        }

        Ok(())
    }
}

/// Trigger codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeConfig {
    pub secret: Code,
    pub guest: Code,
    pub admin: Code,
    pub panic: Code,
    pub ambulance: Code,
    pub firefighter: Code,
    pub burglar: Code,
    pub trap: Code,
    pub disco: Code,
    pub stealth: Code,
}

impl CodeConfig {
    /// All trigger codes with their names, in classification priority order.
    #[must_use]
    pub fn triggers(&self) -> [(&'static str, &Code); 10] {
        [
            ("secret", &self.secret),
            ("guest", &self.guest),
            ("admin", &self.admin),
            ("ambulance", &self.ambulance),
            ("firefighter", &self.firefighter),
            ("burglar", &self.burglar),
            ("trap", &self.trap),
            ("disco", &self.disco),
            ("stealth", &self.stealth),
            ("panic", &self.panic),
        ]
    }
}

const BUILTIN_CODES: [&str; 10] = [
    DEFAULT_SECRET_CODE,
    DEFAULT_GUEST_CODE,
    DEFAULT_ADMIN_CODE,
    DEFAULT_PANIC_CODE,
    DEFAULT_AMBULANCE_CODE,
    DEFAULT_FIREFIGHTER_CODE,
    DEFAULT_BURGLAR_CODE,
    DEFAULT_TRAP_CODE,
    DEFAULT_DISCO_CODE,
    DEFAULT_STEALTH_CODE,
];

const _: () = {
    let mut i = 0;
    while i < BUILTIN_CODES.len() {
        assert!(Code::is_well_formed(BUILTIN_CODES[i]), "invalid built-in code");
        i += 1;
    }
};

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            secret: Code::from_builtin(DEFAULT_SECRET_CODE),
            guest: Code::from_builtin(DEFAULT_GUEST_CODE),
            admin: Code::from_builtin(DEFAULT_ADMIN_CODE),
            panic: Code::from_builtin(DEFAULT_PANIC_CODE),
            ambulance: Code::from_builtin(DEFAULT_AMBULANCE_CODE),
            firefighter: Code::from_builtin(DEFAULT_FIREFIGHTER_CODE),
            burglar: Code::from_builtin(DEFAULT_BURGLAR_CODE),
            trap: Code::from_builtin(DEFAULT_TRAP_CODE),
            disco: Code::from_builtin(DEFAULT_DISCO_CODE),
            stealth: Code::from_builtin(DEFAULT_STEALTH_CODE),
        }
    }
}

/// Durations (milliseconds) and thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub lock_duration_ms: u64,
    pub unlock_blink_ms: u64,
    pub failure_limit: u32,
    pub lockdown_duration_ms: u64,
    /// Alert tone and red blink length; defaults to the full lockdown.
    pub lockdown_alarm_ms: Option<u64>,
    pub panic_duration_ms: u64,
    pub panic_pulse_ms: u64,
    /// 0 disables guest code expiry.
    pub guest_validity_ms: u64,
    pub tick_ms: u64,
    pub lockdown_tick_ms: u64,
}

impl TimingConfig {
    #[must_use]
    pub fn lock_duration(&self) -> Duration {
        Duration::from_millis(self.lock_duration_ms)
    }

    #[must_use]
    pub fn unlock_blink(&self) -> Duration {
        Duration::from_millis(self.unlock_blink_ms)
    }

    #[must_use]
    pub fn lockdown_duration(&self) -> Duration {
        Duration::from_millis(self.lockdown_duration_ms)
    }

    #[must_use]
    pub fn lockdown_alarm(&self) -> Duration {
        Duration::from_millis(self.lockdown_alarm_ms.unwrap_or(self.lockdown_duration_ms))
    }

    #[must_use]
    pub fn panic_duration(&self) -> Duration {
        Duration::from_millis(self.panic_duration_ms)
    }

    #[must_use]
    pub fn panic_pulse(&self) -> Duration {
        Duration::from_millis(self.panic_pulse_ms)
    }

    /// `None` when the guest code never expires.
    #[must_use]
    pub fn guest_validity(&self) -> Option<Duration> {
        (self.guest_validity_ms > 0).then(|| Duration::from_millis(self.guest_validity_ms))
    }

    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    #[must_use]
    pub fn lockdown_tick(&self) -> Duration {
        Duration::from_millis(self.lockdown_tick_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            lock_duration_ms: DEFAULT_LOCK_DURATION_MS,
            unlock_blink_ms: DEFAULT_UNLOCK_BLINK_MS,
            failure_limit: DEFAULT_FAILURE_LIMIT,
            lockdown_duration_ms: DEFAULT_LOCKDOWN_DURATION_MS,
            lockdown_alarm_ms: None,
            panic_duration_ms: DEFAULT_PANIC_DURATION_MS,
            panic_pulse_ms: DEFAULT_PANIC_PULSE_MS,
            guest_validity_ms: DEFAULT_GUEST_VALIDITY_MS,
            tick_ms: DEFAULT_TICK_MS,
            lockdown_tick_ms: DEFAULT_LOCKDOWN_TICK_MS,
        }
    }
}

/// Which key to report when several channels rise within one poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPolicy {
    /// Lowest key id wins.
    #[default]
    FirstInScanOrder,

    /// Highest key id wins.
    LastInScanOrder,
}

impl std::str::FromStr for ScanPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "first" | "first_in_scan_order" => Ok(ScanPolicy::FirstInScanOrder),
            "last" | "last_in_scan_order" => Ok(ScanPolicy::LastInScanOrder),
            other => Err(Error::Config(format!("unknown scan policy: {other}"))),
        }
    }
}

/// Keypad behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeypadConfig {
    pub scan_policy: ScanPolicy,

    /// Play a short click on every accepted key press.
    pub key_feedback: bool,
}

impl Default for KeypadConfig {
    fn default() -> Self {
        Self {
            scan_policy: ScanPolicy::default(),
            key_feedback: true,
        }
    }
}
