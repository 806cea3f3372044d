//! Code storage and classification.

use crate::profile::SpecialModeProfile;
use latchkey_core::{Code, CodeConfig, LockConfig, constants::CODE_LENGTH};
use tokio::time::Instant;
use tracing::info;

/// Availability of the one-time guest code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestStatus {
    Available,
    AlreadyUsed,
    Expired,
}

/// A non-unlock mode selected by its trigger code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialMode {
    Profile(SpecialModeProfile),

    /// Silent panic: door stays locked, no visible alarm.
    Panic,
}

/// What a submitted code means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Secret,
    Guest(GuestStatus),
    AdminTrigger,
    Special(SpecialMode),
    Unknown,
}

/// The one-time guest code.
#[derive(Debug, Clone)]
pub struct GuestCode {
    code: Code,
    used: bool,
    expires_at: Option<Instant>,
}

impl GuestCode {
    pub fn new(code: Code, expires_at: Option<Instant>) -> Self {
        Self {
            code,
            used: false,
            expires_at,
        }
    }

    pub fn code(&self) -> &Code {
        &self.code
    }

    pub fn is_used(&self) -> bool {
        self.used
    }

    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    /// Availability at `now`. Use takes precedence over expiry.
    pub fn status(&self, now: Instant) -> GuestStatus {
        if self.used {
            GuestStatus::AlreadyUsed
        } else if self.expires_at.is_some_and(|t| now >= t) {
            GuestStatus::Expired
        } else {
            GuestStatus::Available
        }
    }

    /// Consume the code. There is no way back short of a restart.
    pub fn mark_used(&mut self) {
        self.used = true;
    }
}

/// Holds every code the door knows and classifies submissions.
///
/// Classification is an exact-match test in priority order: secret, guest,
/// admin trigger, each special-mode trigger, panic. Anything else, including
/// input that is not exactly four digits, is [`Outcome::Unknown`].
#[derive(Debug, Clone)]
pub struct CodeRegistry {
    secret: Code,
    guest: GuestCode,
    admin: Code,
    panic: Code,
    profiles: Vec<(Code, SpecialModeProfile)>,
}

impl CodeRegistry {
    /// Build a registry; the guest code expires at `guest_expires_at`.
    pub fn new(codes: &CodeConfig, guest_expires_at: Option<Instant>) -> Self {
        Self {
            secret: codes.secret.clone(),
            guest: GuestCode::new(codes.guest.clone(), guest_expires_at),
            admin: codes.admin.clone(),
            panic: codes.panic.clone(),
            profiles: SpecialModeProfile::ALL
                .iter()
                .map(|&p| (p.trigger(codes).clone(), p))
                .collect(),
        }
    }

    /// Build a registry whose guest code becomes valid at `now`.
    pub fn from_config(config: &LockConfig, now: Instant) -> Self {
        let expires_at = config.timing.guest_validity().map(|v| now + v);
        Self::new(&config.codes, expires_at)
    }

    /// Classify a submission. Total: every input maps to exactly one outcome.
    pub fn classify(&self, input: &str, now: Instant) -> Outcome {
        if input.len() != CODE_LENGTH {
            return Outcome::Unknown;
        }

        if self.secret.matches(input) {
            return Outcome::Secret;
        }
        if self.guest.code.matches(input) {
            return Outcome::Guest(self.guest.status(now));
        }
        if self.admin.matches(input) {
            return Outcome::AdminTrigger;
        }
        if let Some(&(_, profile)) = self.profiles.iter().find(|(code, _)| code.matches(input)) {
            return Outcome::Special(SpecialMode::Profile(profile));
        }
        if self.panic.matches(input) {
            return Outcome::Special(SpecialMode::Panic);
        }
        Outcome::Unknown
    }

    /// Replace the secret code. Format and confirmation are the caller's job.
    pub fn commit_secret(&mut self, code: Code) {
        info!(code = %code.masked(), "secret code replaced");
        self.secret = code;
    }

    pub fn mark_guest_used(&mut self) {
        self.guest.mark_used();
    }

    pub fn secret(&self) -> &Code {
        &self.secret
    }

    pub fn guest(&self) -> &GuestCode {
        &self.guest
    }
}
