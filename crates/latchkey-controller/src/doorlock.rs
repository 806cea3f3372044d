//! The keypad main loop.
//!
//! [`Doorlock`] is the single cooperative dispatcher: every tick it polls the
//! keypad, routes the key to the input buffer or the admin session, and hands
//! finalized entries to the [`ModeController`]. A mode handler blocks the loop
//! for its whole sequence, so no key is read while a mode runs.
//!
//! ```text
//!            ┌────────────── tick ──────────────┐
//!            │                                  │
//!   lockdown active? ──yes──► drain keys, sleep lockdown_tick
//!            │no, or just expired: discard backlog
//!   poll keypad ──► admin active? ──yes──► digits / submit / clear ──► admin
//!            │                 │no
//!            │                 └──► InputBuffer ──submit──► dispatch
//!            └──► sleep tick
//! ```

use crate::buzzer::ToneTask;
use crate::controller::{Dispatch, ModeController};
use crate::error::Result;
use crate::tones;
use latchkey_core::{Key, KeyId, LockConfig};
use latchkey_hardware::ChannelSensor;
use latchkey_keypad::{InputBuffer, KeypadReader};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

/// Keypad reader, input buffer and mode controller wired into one loop.
#[derive(Debug)]
pub struct Doorlock<S> {
    reader: KeypadReader<S>,
    buffer: InputBuffer,
    controller: ModeController,
    key_feedback: bool,

    /// Click of the last key press, joined before the next one and before
    /// any handler runs.
    pending_click: Option<ToneTask>,

    tick: Duration,
    lockdown_tick: Duration,
}

impl<S: ChannelSensor> Doorlock<S> {
    pub fn new(reader: KeypadReader<S>, controller: ModeController, config: &LockConfig) -> Self {
        Self {
            reader,
            buffer: InputBuffer::new(),
            controller,
            key_feedback: config.keypad.key_feedback,
            pending_click: None,
            tick: config.timing.tick(),
            lockdown_tick: config.timing.lockdown_tick(),
        }
    }

    pub fn controller(&self) -> &ModeController {
        &self.controller
    }

    pub fn buffer(&self) -> &InputBuffer {
        &self.buffer
    }

    /// Put the door in its initial locked appearance.
    ///
    /// # Errors
    ///
    /// Returns an error if an actuator write fails.
    pub fn start(&mut self) -> Result<()> {
        self.buffer.clear();
        self.controller.lock_door()
    }

    /// Run one iteration of the loop.
    ///
    /// Returns the report of the handler that ran, if a submission or an
    /// admin abort was dispatched during this tick.
    ///
    /// # Errors
    ///
    /// Returns an error for sensor or actuator faults, which are fatal.
    pub async fn tick(&mut self) -> Result<Option<Dispatch>> {
        let now = Instant::now();
        if self.controller.lockdown_until().is_some() {
            if !self.controller.expire_lockdown(now)? {
                if let Some(key) = self.reader.poll()? {
                    debug!(%key, "lockdown active, key ignored");
                }
                sleep(self.lockdown_tick).await;
                return Ok(None);
            }

            // The alarm may have covered the whole window, so nothing was
            // polled during it. Anything pressed since is stale.
            let dropped = self.reader.resync()?;
            self.buffer.clear();
            if dropped > 0 {
                debug!(dropped, "input from the lockdown window discarded");
            }
        }

        let dispatch = match self.reader.poll()? {
            Some(key) => self.handle_key(key).await?,
            None => None,
        };

        sleep(self.tick).await;
        Ok(dispatch)
    }

    /// Route one key press.
    ///
    /// While an admin session is active the key goes to the session only:
    /// digits append, submit finalizes and clear aborts.
    ///
    /// # Errors
    ///
    /// Returns an error for actuator faults or a failed tone task.
    pub async fn handle_key(&mut self, id: KeyId) -> Result<Option<Dispatch>> {
        let key = id.key();
        self.click().await?;

        if self.controller.is_admin_active() {
            match key {
                Key::Digit(_) => {
                    self.buffer.push(key);
                    Ok(None)
                }
                Key::Submit => {
                    self.settle_click().await?;
                    let submission = self.buffer.submit();
                    self.controller.admin_submit(submission).await.map(Some)
                }
                Key::Clear => {
                    self.buffer.clear();
                    self.settle_click().await?;
                    self.controller.admin_abort().await.map(Some)
                }
            }
        } else {
            match key {
                Key::Submit => {
                    self.settle_click().await?;
                    let submission = self.buffer.submit();
                    let dispatch = self.controller.dispatch(submission).await?;
                    if let Some(rejection) = dispatch.rejection {
                        debug!(mode = %dispatch.mode, %rejection, "submission rejected");
                    }
                    Ok(Some(dispatch))
                }
                Key::Digit(_) | Key::Clear => {
                    self.buffer.push(key);
                    Ok(None)
                }
            }
        }
    }

    /// Run until `shutdown` resolves or a fault occurs.
    ///
    /// A handler in progress when `shutdown` resolves is dropped mid-sequence;
    /// the caller is responsible for switching the outputs off afterwards.
    ///
    /// # Errors
    ///
    /// Returns the first sensor, actuator or tone task fault.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        self.start()?;
        info!(
            tick = ?self.tick,
            policy = ?self.reader.policy(),
            "keypad ready"
        );

        loop {
            let result = tokio::select! {
                () = &mut shutdown => None,
                result = self.tick() => Some(result),
            };
            let Some(result) = result else {
                info!("shutdown requested");
                break;
            };
            if let Some(dispatch) = result? {
                debug!(mode = %dispatch.mode, state = %self.controller.state(), "cycle complete");
            }
        }

        self.pending_click = None;
        Ok(())
    }

    /// Start the key-press click, after the previous one has finished.
    async fn click(&mut self) -> Result<()> {
        self.settle_click().await?;
        if self.key_feedback {
            self.pending_click = Some(self.controller.buzzer().spawn(tones::keypress()));
        }
        Ok(())
    }

    async fn settle_click(&mut self) -> Result<()> {
        if let Some(click) = self.pending_click.take() {
            click.join().await?;
        }
        Ok(())
    }
}
