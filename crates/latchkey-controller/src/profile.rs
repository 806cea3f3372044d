//! Special-mode profiles.
//!
//! Every special mode runs the same routine (motor on, tone task, LED loop,
//! join, re-lock); a [`SpecialModeProfile`] only supplies the parameters.

use crate::buzzer::ToneSequence;
use crate::tones;
use latchkey_core::{Code, CodeConfig};
use latchkey_hardware::Indicator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Length of every special mode except disco.
pub const SPECIAL_MODE_DURATION: Duration = Duration::from_secs(10);

/// Length of the disco party.
pub const PARTY_MODE_DURATION: Duration = Duration::from_secs(15);

/// Which indicators light during the "on" half of a blink cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkStyle {
    /// One indicator on, then both off.
    Single(Indicator),

    /// Both indicators on, then both off.
    Simultaneous,

    /// Locked indicator on, then open indicator on (cross-blink).
    Alternating,
}

impl BlinkStyle {
    /// Indicator levels `(locked, open)` for each half of the cycle.
    pub fn frames(self) -> [(bool, bool); 2] {
        match self {
            BlinkStyle::Single(Indicator::Locked) => [(true, false), (false, false)],
            BlinkStyle::Single(Indicator::Open) => [(false, true), (false, false)],
            BlinkStyle::Simultaneous => [(true, true), (false, false)],
            BlinkStyle::Alternating => [(true, false), (false, true)],
        }
    }
}

/// LED timing of a blink loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkPattern {
    pub on: Duration,
    pub off: Duration,
    pub style: BlinkStyle,
}

impl BlinkPattern {
    pub const fn new(style: BlinkStyle, on: Duration, off: Duration) -> Self {
        Self { on, off, style }
    }

    /// Length of one on/off cycle.
    pub fn period(&self) -> Duration {
        self.on + self.off
    }
}

/// Non-unlock alert sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialModeProfile {
    Ambulance,
    Firefighter,
    Burglar,
    Trap,
    Disco,
    Stealth,
}

impl SpecialModeProfile {
    /// All profiles, in classification order.
    pub const ALL: [SpecialModeProfile; 6] = [
        SpecialModeProfile::Ambulance,
        SpecialModeProfile::Firefighter,
        SpecialModeProfile::Burglar,
        SpecialModeProfile::Trap,
        SpecialModeProfile::Disco,
        SpecialModeProfile::Stealth,
    ];

    /// The configured code that triggers this profile.
    pub fn trigger(self, codes: &CodeConfig) -> &Code {
        match self {
            SpecialModeProfile::Ambulance => &codes.ambulance,
            SpecialModeProfile::Firefighter => &codes.firefighter,
            SpecialModeProfile::Burglar => &codes.burglar,
            SpecialModeProfile::Trap => &codes.trap,
            SpecialModeProfile::Disco => &codes.disco,
            SpecialModeProfile::Stealth => &codes.stealth,
        }
    }

    /// Motor PWM speed while the mode runs.
    pub fn motor_speed(self) -> u8 {
        match self {
            SpecialModeProfile::Ambulance | SpecialModeProfile::Firefighter => 80,
            SpecialModeProfile::Burglar | SpecialModeProfile::Trap => 30,
            SpecialModeProfile::Disco => 0,
            SpecialModeProfile::Stealth => 20,
        }
    }

    pub fn blink(self) -> BlinkPattern {
        let ms = Duration::from_millis;
        match self {
            SpecialModeProfile::Ambulance => {
                BlinkPattern::new(BlinkStyle::Single(Indicator::Open), ms(500), ms(500))
            }
            SpecialModeProfile::Firefighter => {
                BlinkPattern::new(BlinkStyle::Single(Indicator::Locked), ms(500), ms(500))
            }
            SpecialModeProfile::Burglar => {
                BlinkPattern::new(BlinkStyle::Simultaneous, ms(500), ms(500))
            }
            SpecialModeProfile::Trap => {
                BlinkPattern::new(BlinkStyle::Alternating, ms(1000), ms(1000))
            }
            SpecialModeProfile::Disco => BlinkPattern::new(BlinkStyle::Alternating, ms(50), ms(50)),
            SpecialModeProfile::Stealth => {
                BlinkPattern::new(BlinkStyle::Single(Indicator::Open), ms(10), ms(800))
            }
        }
    }

    /// Total time the mode holds the door controller.
    pub fn duration(self) -> Duration {
        match self {
            SpecialModeProfile::Disco => PARTY_MODE_DURATION,
            _ => SPECIAL_MODE_DURATION,
        }
    }

    /// Tone played alongside the LED loop.
    pub fn tone(self) -> ToneSequence {
        let window = self.duration();
        match self {
            SpecialModeProfile::Ambulance => tones::ambulance_siren(window),
            SpecialModeProfile::Firefighter => tones::firefighter_siren(window),
            SpecialModeProfile::Burglar => tones::burglar_alarm(window),
            SpecialModeProfile::Trap => tones::trap_melody(window),
            SpecialModeProfile::Disco => tones::disco_melody(window),
            SpecialModeProfile::Stealth => tones::stealth_pulse(),
        }
    }
}

impl fmt::Display for SpecialModeProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpecialModeProfile::Ambulance => "Ambulance",
            SpecialModeProfile::Firefighter => "Firefighter",
            SpecialModeProfile::Burglar => "Burglar",
            SpecialModeProfile::Trap => "Trap",
            SpecialModeProfile::Disco => "Disco",
            SpecialModeProfile::Stealth => "Stealth",
        };
        write!(f, "{name}")
    }
}
