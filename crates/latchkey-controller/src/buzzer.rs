//! Exclusive access to the single buzzer output.
//!
//! The door has one PWM buzzer channel and several things that want to make
//! noise: mode handlers, key-press clicks, the startup self-test. The
//! [`BuzzerArbiter`] owns the output behind a Tokio mutex; every
//! [`ToneSequence`] is played while holding the lock and ends with the output
//! silenced, so two sequences never overlap on the channel. The mutex is
//! fair, so concurrent requests play in the order they asked for the lock.
//!
//! Handlers run a sequence concurrently with their LED loop by spawning it
//! ([`BuzzerArbiter::spawn`]) and must [`join`](ToneTask::join) the returned
//! task before leaving their state.

use crate::error::{ControllerError, Result};
use latchkey_core::constants::{NOTE_UNIT_MS, TONE_DUTY};
use latchkey_hardware::ToneOutput;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, sleep};
use tracing::{debug, trace};

/// One frequency/duty setting held for a fixed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneStep {
    pub freq_hz: u32,
    pub duty: u8,
    pub hold: Duration,
}

impl ToneStep {
    /// Audible tone at the standard duty cycle.
    pub const fn tone(freq_hz: u32, hold: Duration) -> Self {
        Self {
            freq_hz,
            duty: TONE_DUTY,
            hold,
        }
    }

    /// Audible tone at a custom duty cycle.
    pub const fn with_duty(freq_hz: u32, duty: u8, hold: Duration) -> Self {
        Self {
            freq_hz,
            duty,
            hold,
        }
    }

    /// Silence.
    pub const fn rest(hold: Duration) -> Self {
        Self {
            freq_hz: 0,
            duty: 0,
            hold,
        }
    }

    /// Melody note lasting `tenths` tenths of a note unit (0.2 s per unit).
    /// Frequency 0 is a rest.
    pub const fn note(freq_hz: u32, tenths: u64) -> Self {
        let hold = Duration::from_millis(NOTE_UNIT_MS * tenths / 10);
        if freq_hz == 0 {
            Self::rest(hold)
        } else {
            Self::tone(freq_hz, hold)
        }
    }

    /// Returns `true` if this step makes no sound.
    pub fn is_rest(&self) -> bool {
        self.freq_hz == 0 || self.duty == 0
    }

    fn sound(&self, output: &dyn ToneOutput) -> latchkey_hardware::Result<()> {
        if self.is_rest() {
            output.silence()
        } else {
            output.set_tone(self.freq_hz, self.duty)
        }
    }
}

/// How often a sequence's steps are played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Play the steps this many times.
    Times(u32),

    /// Cycle through the steps until this much time has passed, cutting the
    /// last step short if needed.
    For(Duration),
}

/// A named list of tone steps and a repeat rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneSequence {
    name: &'static str,
    steps: Vec<ToneStep>,
    repeat: Repeat,
}

impl ToneSequence {
    /// Sequence played once.
    pub fn new(name: &'static str, steps: Vec<ToneStep>) -> Self {
        Self {
            name,
            steps,
            repeat: Repeat::Times(1),
        }
    }

    /// Repeat the steps `count` times.
    #[must_use]
    pub fn times(mut self, count: u32) -> Self {
        self.repeat = Repeat::Times(count);
        self
    }

    /// Cycle the steps for `window`.
    #[must_use]
    pub fn looped_for(mut self, window: Duration) -> Self {
        self.repeat = Repeat::For(window);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn steps(&self) -> &[ToneStep] {
        &self.steps
    }

    pub fn repeat(&self) -> Repeat {
        self.repeat
    }

    /// Length of one pass through the steps.
    pub fn cycle_length(&self) -> Duration {
        self.steps.iter().map(|s| s.hold).sum()
    }

    /// Nominal playing time.
    pub fn duration(&self) -> Duration {
        match self.repeat {
            Repeat::Times(n) => self.cycle_length() * n,
            Repeat::For(_) if self.cycle_length().is_zero() => Duration::ZERO,
            Repeat::For(window) => window,
        }
    }

    async fn drive(&self, output: &dyn ToneOutput) -> latchkey_hardware::Result<()> {
        match self.repeat {
            Repeat::Times(count) => {
                for _ in 0..count {
                    for step in &self.steps {
                        step.sound(output)?;
                        sleep(step.hold).await;
                    }
                }
            }
            Repeat::For(window) => {
                // A zero-length cycle would never advance the clock.
                if self.cycle_length().is_zero() {
                    return Ok(());
                }
                let start = Instant::now();
                'cycles: loop {
                    for step in &self.steps {
                        let elapsed = start.elapsed();
                        if elapsed >= window {
                            break 'cycles;
                        }
                        step.sound(output)?;
                        sleep(step.hold.min(window - elapsed)).await;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Mutual-exclusion wrapper around the buzzer output.
///
/// Cheap to clone; all clones share the same output and lock.
#[derive(Clone)]
pub struct BuzzerArbiter {
    output: Arc<Mutex<Box<dyn ToneOutput>>>,
}

impl std::fmt::Debug for BuzzerArbiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuzzerArbiter").finish_non_exhaustive()
    }
}

impl BuzzerArbiter {
    /// Take ownership of the buzzer output.
    pub fn new(output: impl ToneOutput + 'static) -> Self {
        Self {
            output: Arc::new(Mutex::new(Box::new(output))),
        }
    }

    /// Play a sequence on the calling task.
    ///
    /// Waits for the lock, plays every step, then silences the output and
    /// releases the lock. The output is silenced even if a step write fails.
    ///
    /// # Errors
    ///
    /// Returns the first write error.
    pub async fn play(&self, sequence: &ToneSequence) -> Result<()> {
        let output = self.output.lock().await;
        trace!(tone = sequence.name(), "buzzer acquired");

        let played = sequence.drive(&**output).await;
        let silenced = output.silence();

        trace!(tone = sequence.name(), "buzzer released");
        played?;
        silenced?;
        Ok(())
    }

    /// Play a sequence on a new task.
    ///
    /// The returned task must be joined before the caller leaves its current
    /// state. Dropping it unjoined aborts the sequence.
    pub fn spawn(&self, sequence: ToneSequence) -> ToneTask {
        let arbiter = self.clone();
        let name = sequence.name();
        debug!(tone = name, "tone task spawned");
        let handle = tokio::spawn(async move { arbiter.play(&sequence).await });
        ToneTask {
            name,
            handle: Some(handle),
        }
    }

    /// Silence the output once it is free.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn silence(&self) -> Result<()> {
        self.output.lock().await.silence()?;
        Ok(())
    }

    /// Startup check that the buzzer works: two half-second tones.
    ///
    /// # Errors
    ///
    /// Returns an error if a write fails.
    pub async fn self_test(&self) -> Result<()> {
        debug!("buzzer self-test");
        self.play(&crate::tones::self_test()).await
    }
}

/// Handle to a spawned tone sequence.
#[derive(Debug)]
pub struct ToneTask {
    name: &'static str,
    handle: Option<JoinHandle<Result<()>>>,
}

impl ToneTask {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Wait for the sequence to finish.
    ///
    /// # Errors
    ///
    /// Returns the sequence's write error, or `ControllerError::ToneTask` if
    /// the task panicked or was cancelled.
    pub async fn join(mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        let result = handle.await;
        debug!(tone = self.name, "tone task joined");
        match result {
            Ok(played) => played,
            Err(e) => Err(Self::classify_join_error(self.name, &e)),
        }
    }

    fn classify_join_error(name: &'static str, error: &JoinError) -> ControllerError {
        let reason = if error.is_cancelled() {
            "task was cancelled"
        } else {
            "task panicked"
        };
        ControllerError::ToneTask {
            name,
            reason: reason.to_string(),
        }
    }
}

impl Drop for ToneTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_hardware::ActuatorEvent;
    use latchkey_hardware::mock::RecordingActuator;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn beep(name: &'static str, freq: u32) -> ToneSequence {
        ToneSequence::new(name, vec![ToneStep::tone(freq, ms(100)), ToneStep::tone(freq + 1, ms(100))])
    }

    #[test]
    fn test_note_units() {
        let step = ToneStep::note(523, 2);
        assert_eq!(step.hold, ms(40));
        assert_eq!(step.duty, TONE_DUTY);
        assert_eq!(ToneStep::note(392, 5).hold, ms(100));
        assert!(ToneStep::note(0, 10).is_rest());
    }

    #[test]
    fn test_durations() {
        let seq = beep("a", 440).times(3);
        assert_eq!(seq.cycle_length(), ms(200));
        assert_eq!(seq.duration(), ms(600));
        assert_eq!(beep("b", 440).looped_for(ms(250)).duration(), ms(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_ends_silenced() {
        let recorder = RecordingActuator::new();
        let arbiter = BuzzerArbiter::new(recorder.clone());

        let start = Instant::now();
        arbiter.play(&beep("a", 440)).await.unwrap();

        assert_eq!(start.elapsed(), ms(200));
        assert_eq!(recorder.tone_frequencies(), vec![440, 441]);
        assert!(recorder.is_silent());
    }

    #[tokio::test(start_paused = true)]
    async fn test_looped_sequence_is_cut_at_window() {
        let recorder = RecordingActuator::new();
        let arbiter = BuzzerArbiter::new(recorder.clone());

        let start = Instant::now();
        arbiter
            .play(&beep("a", 440).looped_for(ms(250)))
            .await
            .unwrap();

        assert_eq!(start.elapsed(), ms(250));
        assert_eq!(recorder.tone_frequencies(), vec![440, 441, 440]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_sequences_do_not_interleave() {
        let recorder = RecordingActuator::new();
        let arbiter = BuzzerArbiter::new(recorder.clone());

        let first = arbiter.spawn(beep("first", 1000).times(2));
        // Let the first task take the lock before the second asks for it
        tokio::task::yield_now().await;
        let second = arbiter.spawn(beep("second", 2000).times(2));

        first.join().await.unwrap();
        second.join().await.unwrap();

        let tones = recorder.tone_log();
        let first_silence = tones
            .iter()
            .position(ActuatorEvent::is_silence)
            .unwrap();

        // Everything before the first silence belongs to the first sequence,
        // everything after to the second
        assert!(tones[..first_silence].iter().all(|e| matches!(
            e,
            ActuatorEvent::Tone { freq_hz: 1000 | 1001, .. }
        )));
        assert!(tones[first_silence + 1..].iter().all(|e| matches!(
            e,
            ActuatorEvent::Tone { freq_hz: 2000 | 2001, .. } | ActuatorEvent::Tone { duty: 0, .. }
        )));
        assert_eq!(recorder.tone_frequencies().len(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_task_is_aborted() {
        let recorder = RecordingActuator::new();
        let arbiter = BuzzerArbiter::new(recorder.clone());

        let task = arbiter.spawn(beep("long", 300).looped_for(Duration::from_secs(60)));
        tokio::time::sleep(ms(150)).await;
        drop(task);

        // The lock is released, so silencing does not wait out the minute
        let start = Instant::now();
        arbiter.silence().await.unwrap();
        assert!(start.elapsed() < ms(10));
        assert!(recorder.is_silent());
    }

    #[tokio::test(start_paused = true)]
    async fn test_self_test_tones() {
        let recorder = RecordingActuator::new();
        let arbiter = BuzzerArbiter::new(recorder.clone());

        arbiter.self_test().await.unwrap();
        assert_eq!(recorder.tone_frequencies(), vec![1000, 500]);
    }
}
