//! The mode controller.
//!
//! [`ModeController`] owns all mutable access-control state (code registry,
//! failure tracker, admin session, panic flag) and runs one handler per
//! mode. Each handler blocks its caller for the whole sequence, drives the
//! LEDs and motor itself, plays its tone on a spawned
//! [`ToneTask`](crate::buzzer::ToneTask) and joins that task before returning
//! to `Locked`.

use crate::admin::{AdminEvent, AdminSession, AdminStep};
use crate::buzzer::{BuzzerArbiter, ToneSequence};
use crate::error::Result;
use crate::failure::{FailureOutcome, FailureTracker};
use crate::panic::PanicState;
use crate::profile::{BlinkPattern, BlinkStyle, SpecialModeProfile};
use crate::registry::{CodeRegistry, GuestStatus, Outcome, SpecialMode};
use crate::state::{LockState, StateMachine, StateTransition};
use crate::tones;
use latchkey_core::constants::NOMINAL_MOTOR_SPEED;
use latchkey_core::{LockConfig, Rejection, TimingConfig};
use latchkey_hardware::{Indicator, LockActuator};
use latchkey_keypad::Submission;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

const UNLOCK_BLINK: Duration = Duration::from_millis(150);
const FAIL_FLICKER: Duration = Duration::from_millis(100);
const FAIL_FLICKER_COUNT: u32 = 3;
const LOCKDOWN_BLINK: Duration = Duration::from_millis(50);
const ADMIN_PROMPT_BLINK: Duration = Duration::from_millis(200);
const ADMIN_PROMPT_COUNT: u32 = 2;
const ADMIN_COMMIT_HOLD: Duration = Duration::from_millis(1500);

/// Report of one handled submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    /// State the handler ran in (`Locked` if nothing ran).
    pub mode: LockState,

    /// Why the submission was refused, if it was.
    pub rejection: Option<Rejection>,
}

impl Dispatch {
    fn accepted(mode: LockState) -> Self {
        Self {
            mode,
            rejection: None,
        }
    }

    fn rejected(mode: LockState, rejection: Rejection) -> Self {
        Self {
            mode,
            rejection: Some(rejection),
        }
    }
}

/// The access-control state machine and its mode handlers.
pub struct ModeController {
    registry: CodeRegistry,
    failures: FailureTracker,
    admin: AdminSession,
    panic: PanicState,
    machine: StateMachine,
    actuator: Arc<dyn LockActuator>,
    buzzer: BuzzerArbiter,
    timing: TimingConfig,
}

impl std::fmt::Debug for ModeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeController")
            .field("state", &self.machine.current_state())
            .field("failures", &self.failures.count())
            .field("admin", &self.admin.step())
            .finish_non_exhaustive()
    }
}

impl ModeController {
    /// Create a controller in the `Locked` state. The guest code's validity
    /// window starts now.
    pub fn new(config: &LockConfig, actuator: Arc<dyn LockActuator>, buzzer: BuzzerArbiter) -> Self {
        Self {
            registry: CodeRegistry::from_config(config, Instant::now()),
            failures: FailureTracker::new(config.timing.failure_limit),
            admin: AdminSession::new(),
            panic: PanicState::new(),
            machine: StateMachine::new(),
            actuator,
            buzzer,
            timing: config.timing.clone(),
        }
    }

    /// Share a panic flag with other alert sources.
    #[must_use]
    pub fn with_panic_state(mut self, panic: PanicState) -> Self {
        self.panic = panic;
        self
    }

    pub fn state(&self) -> LockState {
        self.machine.current_state()
    }

    pub fn history(&self) -> &VecDeque<StateTransition> {
        self.machine.history()
    }

    pub fn registry(&self) -> &CodeRegistry {
        &self.registry
    }

    pub fn failure_count(&self) -> u32 {
        self.failures.count()
    }

    pub fn lockdown_until(&self) -> Option<Instant> {
        self.failures.lockdown_until()
    }

    pub fn admin_step(&self) -> AdminStep {
        self.admin.step()
    }

    pub fn is_admin_active(&self) -> bool {
        self.admin.is_active()
    }

    pub fn panic_state(&self) -> &PanicState {
        &self.panic
    }

    pub fn buzzer(&self) -> &BuzzerArbiter {
        &self.buzzer
    }

    /// Put the outputs in the locked appearance and enter `Locked`.
    ///
    /// # Errors
    ///
    /// Returns an error if an actuator write fails.
    pub fn lock_door(&mut self) -> Result<()> {
        self.show(true, false)?;
        self.actuator.set_motor(false, 0)?;
        if self.state() != LockState::Locked {
            self.enter(LockState::Locked)?;
        }
        info!("door locked");
        Ok(())
    }

    /// Classify a submission made in `Locked` and run its handler.
    ///
    /// # Errors
    ///
    /// Returns an error only for hardware faults or a failed tone task.
    pub async fn dispatch(&mut self, submission: Submission) -> Result<Dispatch> {
        let outcome = self.registry.classify(submission.as_str(), Instant::now());
        debug!(?outcome, len = submission.as_str().len(), "code submitted");

        match outcome {
            Outcome::Secret => self.run_unlock().await,
            Outcome::Guest(GuestStatus::Available) => self.run_guest().await,
            Outcome::Guest(GuestStatus::AlreadyUsed) => {
                self.run_failure(Rejection::GuestCodeReused).await
            }
            Outcome::Guest(GuestStatus::Expired) => {
                self.run_failure(Rejection::GuestCodeExpired).await
            }
            Outcome::AdminTrigger => self.run_admin_entry().await,
            Outcome::Special(SpecialMode::Profile(profile)) => self.run_special(profile).await,
            Outcome::Special(SpecialMode::Panic) => self.run_panic().await,
            Outcome::Unknown => self.run_failure(Rejection::UnknownCode).await,
        }
    }

    /// Feed a finalized entry to the active admin session.
    ///
    /// # Errors
    ///
    /// Returns an error only for hardware faults or a failed tone task.
    pub async fn admin_submit(&mut self, submission: Submission) -> Result<Dispatch> {
        let mode = self.state();
        let Some(event) = self.admin.submit(submission) else {
            return Ok(Dispatch::accepted(mode));
        };

        match event {
            AdminEvent::Staged => {
                self.enter(LockState::AdminAwaitingConfirm)?;
                info!("new code staged, awaiting confirmation");
                self.pulse(Indicator::Open, true, ADMIN_PROMPT_COUNT, ADMIN_PROMPT_BLINK)
                    .await?;
                Ok(Dispatch::accepted(mode))
            }
            AdminEvent::Confirmed(code) => {
                self.registry.commit_secret(code);
                info!("secret code changed");
                self.buzzer.play(&tones::success()).await?;
                self.show(false, true)?;
                sleep(ADMIN_COMMIT_HOLD).await;
                self.lock_door()?;
                Ok(Dispatch::accepted(mode))
            }
            AdminEvent::Rejected(rejection) => {
                warn!(%rejection, "admin session aborted");
                self.buzzer.play(&tones::admin_fail()).await?;
                if rejection == Rejection::AdminConfirmMismatch {
                    self.pulse(Indicator::Locked, true, FAIL_FLICKER_COUNT, FAIL_FLICKER)
                        .await?;
                }
                self.lock_door()?;
                Ok(Dispatch::rejected(mode, rejection))
            }
        }
    }

    /// Abort the admin session (clear key). Nothing is committed.
    ///
    /// # Errors
    ///
    /// Returns an error only for hardware faults.
    pub async fn admin_abort(&mut self) -> Result<Dispatch> {
        let mode = self.state();
        if !self.admin.is_active() {
            return Ok(Dispatch::accepted(mode));
        }
        self.admin.abort();
        info!("admin session cancelled");
        self.buzzer.play(&tones::admin_fail()).await?;
        self.lock_door()?;
        Ok(Dispatch::accepted(mode))
    }

    /// End the lockdown if its window has passed at `now`.
    ///
    /// Returns `true` if the lockdown was cleared by this call.
    ///
    /// # Errors
    ///
    /// Returns an error if an actuator write fails.
    pub fn expire_lockdown(&mut self, now: Instant) -> Result<bool> {
        if self.failures.lockdown_until().is_none() || self.failures.is_lockdown_active(now) {
            return Ok(false);
        }
        self.failures.clear_lockdown();
        self.failures.record_success();
        info!("lockdown over");
        self.lock_door()?;
        Ok(true)
    }

    pub fn is_lockdown_active(&self, now: Instant) -> bool {
        self.failures.is_lockdown_active(now)
    }

    async fn run_unlock(&mut self) -> Result<Dispatch> {
        self.failures.record_success();
        info!("secret code accepted, opening");
        self.open_door(LockState::Unlocking, tones::success()).await?;
        Ok(Dispatch::accepted(LockState::Unlocking))
    }

    async fn run_guest(&mut self) -> Result<Dispatch> {
        self.registry.mark_guest_used();
        self.failures.record_success();
        info!("guest code accepted, opening");
        self.open_door(LockState::GuestAccess, tones::dingdong()).await?;
        Ok(Dispatch::accepted(LockState::GuestAccess))
    }

    /// Shared unlock shape: motor and blink window with the melody, then a
    /// steady open hold for the rest of the lock duration.
    async fn open_door(&mut self, mode: LockState, melody: ToneSequence) -> Result<()> {
        self.enter(mode)?;
        self.actuator.set_indicator(Indicator::Locked, false)?;
        self.actuator.set_motor(true, NOMINAL_MOTOR_SPEED)?;

        let tone = self.buzzer.spawn(melody);
        let blink = BlinkPattern::new(BlinkStyle::Single(Indicator::Open), UNLOCK_BLINK, UNLOCK_BLINK);
        self.blink_for(blink, self.timing.unlock_blink()).await?;

        self.actuator.set_motor(false, 0)?;
        tone.join().await?;

        self.actuator.set_indicator(Indicator::Open, true)?;
        let hold = self
            .timing
            .lock_duration()
            .saturating_sub(self.timing.unlock_blink());
        debug!(?hold, "holding door open");
        sleep(hold).await;

        self.lock_door()
    }

    async fn run_failure(&mut self, rejection: Rejection) -> Result<Dispatch> {
        match self.failures.record_failure() {
            FailureOutcome::LockdownTriggered => {
                warn!(%rejection, limit = self.failures.limit(), "failure limit reached");
                self.run_lockdown().await?;
                Ok(Dispatch::rejected(LockState::Lockdown, rejection))
            }
            FailureOutcome::Continued { count } => {
                warn!(%rejection, count, limit = self.failures.limit(), "access denied");
                self.enter(LockState::Failing)?;
                self.buzzer.play(&tones::fail_siren()).await?;
                self.pulse(Indicator::Locked, false, FAIL_FLICKER_COUNT, FAIL_FLICKER)
                    .await?;
                self.lock_door()?;
                Ok(Dispatch::rejected(LockState::Failing, rejection))
            }
        }
    }

    /// Arms the lockdown window and runs the alarm. Returns in `Lockdown`;
    /// the main loop clears it once the window has passed.
    async fn run_lockdown(&mut self) -> Result<()> {
        self.enter(LockState::Lockdown)?;
        self.actuator.set_motor(false, 0)?;
        let until = self
            .failures
            .arm_lockdown(Instant::now(), self.timing.lockdown_duration());
        warn!(
            duration = ?self.timing.lockdown_duration(),
            "lockdown armed, keypad disabled"
        );

        let alarm = self.timing.lockdown_alarm();
        let tone = self.buzzer.spawn(tones::super_siren(alarm));
        let blink = BlinkPattern::new(BlinkStyle::Single(Indicator::Locked), LOCKDOWN_BLINK, LOCKDOWN_BLINK);
        self.blink_for(blink, alarm).await?;
        self.show(false, false)?;
        tone.join().await?;

        debug!(remaining = ?until.saturating_duration_since(Instant::now()), "lockdown alarm finished");
        Ok(())
    }

    async fn run_special(&mut self, profile: SpecialModeProfile) -> Result<Dispatch> {
        let mode = LockState::SpecialMode(profile);
        self.enter(mode)?;
        info!(%profile, duration = ?profile.duration(), "special mode");

        self.actuator.set_motor(true, profile.motor_speed())?;
        let tone = self.buzzer.spawn(profile.tone());
        self.blink_for(profile.blink(), profile.duration()).await?;
        tone.join().await?;

        info!(%profile, "special mode finished");
        self.lock_door()?;
        Ok(Dispatch::accepted(mode))
    }

    async fn run_panic(&mut self) -> Result<Dispatch> {
        let Some(_activation) = self.panic.try_activate() else {
            debug!("panic already active, ignoring trigger");
            return Ok(Dispatch::rejected(self.state(), Rejection::PanicReentry));
        };

        self.enter(LockState::Panic)?;
        self.actuator.set_motor(false, 0)?;
        self.show(true, false)?;

        let total = self.timing.panic_duration();
        warn!(duration = ?total, "emergency signal raised");

        let start = Instant::now();
        let tone = self.buzzer.spawn(tones::panic_pulse(self.timing.panic_pulse()));
        sleep(total).await;
        tone.join().await?;
        debug!(elapsed = ?start.elapsed(), "panic pulse finished");

        warn!("emergency signal cleared");
        self.lock_door()?;
        Ok(Dispatch::accepted(LockState::Panic))
    }

    async fn run_admin_entry(&mut self) -> Result<Dispatch> {
        self.admin.begin();
        self.enter(LockState::AdminAwaitingNew)?;
        info!("admin session started, enter new code");
        self.buzzer.play(&tones::admin_entry()).await?;
        Ok(Dispatch::accepted(LockState::AdminAwaitingNew))
    }

    fn enter(&mut self, state: LockState) -> Result<()> {
        let held = self.machine.time_in_current_state();
        let transition = self.machine.transition_to(state)?;
        debug!(from = %transition.from, to = %transition.to, after = ?held, "state transition");
        Ok(())
    }

    /// Write both indicators.
    fn show(&self, locked: bool, open: bool) -> Result<()> {
        self.actuator.set_indicator(Indicator::Locked, locked)?;
        self.actuator.set_indicator(Indicator::Open, open)?;
        Ok(())
    }

    /// Cycle `pattern` until `window` has elapsed. The last cycle is always
    /// completed, so the loop may overrun by up to one period.
    async fn blink_for(&self, pattern: BlinkPattern, window: Duration) -> Result<()> {
        let [(on_locked, on_open), (off_locked, off_open)] = pattern.style.frames();
        let start = Instant::now();
        while start.elapsed() < window {
            self.show(on_locked, on_open)?;
            sleep(pattern.on).await;
            self.show(off_locked, off_open)?;
            sleep(pattern.off).await;
        }
        Ok(())
    }

    /// Toggle one indicator `count` times, starting at `first`.
    async fn pulse(&self, which: Indicator, first: bool, count: u32, interval: Duration) -> Result<()> {
        for _ in 0..count {
            self.actuator.set_indicator(which, first)?;
            sleep(interval).await;
            self.actuator.set_indicator(which, !first)?;
            sleep(interval).await;
        }
        Ok(())
    }
}
