//! The door's tone library.
//!
//! Melodies are written in tenths of a note unit (see [`ToneStep::note`]);
//! sirens and alarms alternate two frequencies at a fixed interval.

use crate::buzzer::{ToneSequence, ToneStep};
use std::time::Duration;

/// Note frequencies (Hz).
pub mod note {
    pub const REST: u32 = 0;
    pub const E4: u32 = 330;
    pub const G4: u32 = 392;
    pub const A4: u32 = 440;
    pub const B4: u32 = 466;
    pub const C5: u32 = 523;
    pub const D5: u32 = 587;
    pub const DS5: u32 = 622;
    pub const E5: u32 = 659;
    pub const G5: u32 = 784;
}

use note::*;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn melody(name: &'static str, notes: &[(u32, u64)]) -> ToneSequence {
    ToneSequence::new(
        name,
        notes
            .iter()
            .map(|&(freq, tenths)| ToneStep::note(freq, tenths))
            .collect(),
    )
}

/// Two tones alternating every `interval`.
fn siren(name: &'static str, high: u32, low: u32, interval: Duration) -> ToneSequence {
    ToneSequence::new(
        name,
        vec![ToneStep::tone(high, interval), ToneStep::tone(low, interval)],
    )
}

/// Unlock success: the opening of Für Elise.
pub fn success() -> ToneSequence {
    melody(
        "fur_elise",
        &[(E5, 10), (DS5, 10), (E5, 10), (DS5, 10), (E5, 10)],
    )
}

/// Guest access: short "ding-dong".
pub fn dingdong() -> ToneSequence {
    melody("dingdong", &[(C5, 2), (G5, 3)])
}

/// Click played on every accepted key press.
pub fn keypress() -> ToneSequence {
    melody("keypress", &[(C5, 2)])
}

/// Wrong code.
pub fn fail_siren() -> ToneSequence {
    siren("fail_siren", 900, 650, ms(150)).times(3)
}

/// Lockdown alert: the loudest, fastest siren, for `window`.
pub fn super_siren(window: Duration) -> ToneSequence {
    siren("super_siren", 1500, 300, ms(30)).looped_for(window)
}

/// Admin session opened.
pub fn admin_entry() -> ToneSequence {
    melody("admin_entry", &[(E4, 5), (REST, 1), (G4, 5), (REST, 1)]).times(2)
}

/// Admin entry rejected or session aborted.
pub fn admin_fail() -> ToneSequence {
    melody("admin_fail", &[(A4, 2), (E4, 2), (A4, 2)])
}

/// Near-inaudible 100 Hz pulse (duty 5) for `window`: 0.5 s on, 1.0 s off.
pub fn panic_pulse(window: Duration) -> ToneSequence {
    ToneSequence::new(
        "panic_pulse",
        vec![ToneStep::with_duty(100, 5, ms(500)), ToneStep::rest(ms(1000))],
    )
    .looped_for(window)
}

/// Startup check: 1000 Hz then 500 Hz, half a second each.
pub fn self_test() -> ToneSequence {
    ToneSequence::new(
        "self_test",
        vec![ToneStep::tone(1000, ms(500)), ToneStep::tone(500, ms(500))],
    )
}

pub fn ambulance_siren(window: Duration) -> ToneSequence {
    siren("ambulance_siren", 950, 650, ms(300)).looped_for(window)
}

pub fn firefighter_siren(window: Duration) -> ToneSequence {
    siren("firefighter_siren", 800, 450, ms(300)).looped_for(window)
}

pub fn burglar_alarm(window: Duration) -> ToneSequence {
    siren("burglar_alarm", 1000, 300, ms(100)).looped_for(window)
}

pub fn trap_melody(window: Duration) -> ToneSequence {
    melody(
        "trap_melody",
        &[
            (C5, 10),
            (REST, 10),
            (DS5, 10),
            (REST, 10),
            (C5, 10),
            (DS5, 10),
            (REST, 10),
            (C5, 10),
            (REST, 10),
            (DS5, 10),
        ],
    )
    .looped_for(window)
}

pub fn disco_melody(window: Duration) -> ToneSequence {
    melody(
        "disco_melody",
        &[
            (C5, 5),
            (G4, 5),
            (E5, 5),
            (C5, 5),
            (D5, 5),
            (G4, 5),
            (A4, 5),
            (E4, 5),
        ],
    )
    .looped_for(window)
}

/// One quiet low pulse.
pub fn stealth_pulse() -> ToneSequence {
    ToneSequence::new("stealth_pulse", vec![ToneStep::with_duty(200, 30, ms(100))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buzzer::Repeat;
    use rstest::rstest;

    #[rstest]
    #[case(success(), 1000)]
    #[case(dingdong(), 100)]
    #[case(keypress(), 40)]
    #[case(fail_siren(), 900)]
    #[case(admin_entry(), 480)]
    #[case(admin_fail(), 120)]
    #[case(self_test(), 1000)]
    #[case(stealth_pulse(), 100)]
    fn test_fixed_lengths(#[case] seq: ToneSequence, #[case] millis: u64) {
        assert_eq!(seq.duration(), ms(millis), "{}", seq.name());
    }

    #[test]
    fn test_windowed_sequences() {
        let window = Duration::from_secs(10);
        for seq in [
            ambulance_siren(window),
            firefighter_siren(window),
            burglar_alarm(window),
            trap_melody(window),
            disco_melody(window),
            super_siren(window),
            panic_pulse(window),
        ] {
            assert_eq!(seq.repeat(), Repeat::For(window), "{}", seq.name());
        }
    }

    #[test]
    fn test_panic_pulse_is_quiet() {
        let seq = panic_pulse(Duration::from_secs(30));
        assert_eq!(seq.steps()[0].freq_hz, 100);
        assert_eq!(seq.steps()[0].duty, 5);
        assert!(seq.steps()[1].is_rest());
    }
}
