//! The trace player
//!
//! [`TracePlayer`] is the single source of truth for which step is active. It
//! advances on a fixed cadence through its [`Scheduler`], accepts transport
//! commands (play, pause, seek, step) and pushes every index change to its
//! subscribers.
//!
//! # Stale ticks
//!
//! Every scheduled tick carries a [`TickToken`]. The player remembers the one
//! token it is waiting for; loading, pausing or seeking forgets it. A tick
//! that was already dispatched when that happened is therefore ignored by
//! [`TracePlayer::on_tick`] instead of moving the new state.

use super::listeners::{Listeners, SubscriptionId};
use super::scheduler::{Scheduler, TickToken, TimerQueue};
use super::{PlaybackState, PlaybackStatus, PlayerConfig};
use crate::trace::{RawTraceStep, Trace, TraceError, TraceStep};
use std::time::Duration;

/// Drives playback of one trace at a time
#[derive(Debug)]
pub struct TracePlayer<S: Scheduler = TimerQueue> {
    config: PlayerConfig,
    trace: Trace,
    state: PlaybackState,
    generation: u64,
    serial: u64,
    pending: Option<TickToken>,
    last_line: Option<u32>,
    scheduler: S,
    listeners: Listeners,
}

impl<S: Scheduler + Default> TracePlayer<S> {
    pub fn new(config: PlayerConfig) -> Self {
        Self::with_scheduler(config, S::default())
    }
}

impl<S: Scheduler> TracePlayer<S> {
    pub fn with_scheduler(config: PlayerConfig, scheduler: S) -> Self {
        TracePlayer {
            config,
            trace: Trace::empty(),
            state: PlaybackState::default(),
            generation: 0,
            serial: 0,
            pending: None,
            last_line: None,
            scheduler,
            listeners: Listeners::default(),
        }
    }

    // ---- loading ----

    /// Validate and install raw steps from the generation service.
    ///
    /// A malformed step rejects the whole trace: the player falls back to the
    /// empty state and the error is returned for the host to display.
    pub fn load(&mut self, raw: &[RawTraceStep]) -> Result<(), TraceError> {
        match Trace::from_raw(raw) {
            Ok(trace) => {
                self.load_trace(trace);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "rejecting execution trace");
                self.load_trace(Trace::empty());
                Err(err)
            }
        }
    }

    /// Install a validated trace, replacing the current one.
    ///
    /// A non-empty trace starts playing from its first step. A one-step trace
    /// is already at its end, so it finishes immediately.
    pub fn load_trace(&mut self, trace: Trace) {
        self.cancel_pending();
        self.generation += 1;
        self.trace = trace;

        tracing::debug!(
            generation = self.generation,
            steps = self.trace.len(),
            "trace loaded"
        );

        let Some(last) = self.trace.last_index() else {
            self.state = PlaybackState::default();
            self.set_line(None);
            return;
        };

        self.state = PlaybackState {
            current_index: Some(0),
            is_playing: true,
        };
        // A new trace always announces its first line, even if the previous
        // trace ended on the same one
        if self.current_line().is_some() {
            self.last_line = None;
        }
        self.emit_step(0);

        if last == 0 {
            self.finish();
        } else {
            self.schedule_tick();
        }
    }

    /// Drop the current trace (new run requested or source edited)
    pub fn clear(&mut self) {
        self.load_trace(Trace::empty());
    }

    // ---- transport ----

    /// Resume autoplay. No-op on an empty trace, at the last step, or when
    /// already playing.
    pub fn play(&mut self) {
        let (Some(index), Some(last)) = (self.state.current_index, self.trace.last_index()) else {
            return;
        };
        if index >= last || self.state.is_playing {
            return;
        }
        self.state.is_playing = true;
        self.schedule_tick();
    }

    /// Stop autoplay; idempotent
    pub fn pause(&mut self) {
        self.cancel_pending();
        self.state.is_playing = false;
    }

    pub fn toggle(&mut self) {
        if self.state.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Jump to `index`, clamped into the trace. Always pauses autoplay.
    pub fn seek(&mut self, index: i64) {
        let Some(last) = self.trace.last_index() else {
            return;
        };
        self.pause();

        let target = index.clamp(0, last as i64) as usize;
        if self.state.current_index == Some(target) {
            return;
        }
        tracing::debug!(from = ?self.state.current_index, to = target, "seek");
        self.state.current_index = Some(target);
        self.emit_step(target);
    }

    pub fn step_forward(&mut self) {
        if let Some(index) = self.state.current_index {
            self.seek(index as i64 + 1);
        }
    }

    pub fn step_backward(&mut self) {
        if let Some(index) = self.state.current_index {
            self.seek(index as i64 - 1);
        }
    }

    pub fn jump_to_start(&mut self) {
        self.seek(0);
    }

    pub fn jump_to_end(&mut self) {
        self.seek(i64::MAX);
    }

    /// Scheduler callback. Returns true if the tick advanced playback.
    pub fn on_tick(&mut self, token: TickToken) -> bool {
        if token.generation != self.generation || self.pending != Some(token) {
            tracing::debug!(?token, generation = self.generation, "ignoring stale tick");
            return false;
        }
        self.pending = None;

        let (Some(index), Some(last)) = (self.state.current_index, self.trace.last_index()) else {
            return false;
        };
        if !self.state.is_playing || index >= last {
            self.state.is_playing = false;
            return false;
        }

        let next = index + 1;
        self.state.current_index = Some(next);
        self.emit_step(next);

        if next == last {
            self.finish();
        } else {
            self.schedule_tick();
        }
        true
    }

    // ---- subscriptions ----

    /// Called with `(index, step)` on every index change
    pub fn on_step_changed(
        &mut self,
        listener: impl FnMut(usize, &TraceStep) + Send + 'static,
    ) -> SubscriptionId {
        self.listeners.add_step(Box::new(listener))
    }

    /// Called when the highlighted source line changes
    pub fn on_line_changed(
        &mut self,
        listener: impl FnMut(Option<u32>) + Send + 'static,
    ) -> SubscriptionId {
        self.listeners.add_line(Box::new(listener))
    }

    /// Called once when autoplay reaches the final step
    pub fn on_finished(&mut self, listener: impl FnMut() + Send + 'static) -> SubscriptionId {
        self.listeners.add_finished(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    // ---- readers ----

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn status(&self) -> PlaybackStatus {
        match (self.state.current_index, self.state.is_playing) {
            (None, _) => PlaybackStatus::Empty,
            (Some(_), true) => PlaybackStatus::Playing,
            (Some(index), false) if Some(index) == self.trace.last_index() => {
                PlaybackStatus::Finished
            }
            (Some(_), false) => PlaybackStatus::Paused,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn current_index(&self) -> Option<usize> {
        self.state.current_index
    }

    pub fn current_step(&self) -> Option<&TraceStep> {
        self.state
            .current_index
            .and_then(|index| self.trace.get(index))
    }

    /// Source line of the current step, the same value last pushed to line
    /// subscribers
    pub fn current_line(&self) -> Option<u32> {
        self.current_step().and_then(|step| step.source_line)
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn len(&self) -> usize {
        self.trace.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trace.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Token of the tick the player is waiting for, if any
    pub fn pending_tick(&self) -> Option<TickToken> {
        self.pending
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// "Step 3/7", or "No trace"
    pub fn position_label(&self) -> String {
        match self.state.current_index {
            Some(index) => format!("Step {}/{}", index + 1, self.trace.len()),
            None => "No trace".to_string(),
        }
    }

    // ---- internals ----

    fn schedule_tick(&mut self) {
        self.cancel_pending();
        self.serial += 1;
        let token = TickToken {
            generation: self.generation,
            serial: self.serial,
        };
        self.pending = Some(token);
        self.scheduler.schedule(self.config.cadence, token);
    }

    fn cancel_pending(&mut self) {
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel(token);
        }
    }

    fn finish(&mut self) {
        self.state.is_playing = false;
        tracing::debug!(generation = self.generation, "playback finished");
        self.listeners.emit_finished();
    }

    fn emit_step(&mut self, index: usize) {
        let Some(step) = self.trace.get(index) else {
            return;
        };
        let line = step.source_line;
        self.listeners.emit_step(index, step);
        self.set_line(line);
    }

    fn set_line(&mut self, line: Option<u32>) {
        if self.last_line != line {
            self.last_line = line;
            self.listeners.emit_line(line);
        }
    }
}

impl TracePlayer<TimerQueue> {
    /// Move the virtual clock to `elapsed` and apply every due tick.
    ///
    /// Returns the number of steps advanced. Delays are counted from the tick
    /// that scheduled them, so a long gap between calls advances one step,
    /// not several.
    pub fn advance_to(&mut self, elapsed: Duration) -> usize {
        let due = self.scheduler.advance_to(elapsed);
        due.into_iter().filter(|&token| self.on_tick(token)).count()
    }

    /// Move the virtual clock forward by `delta`
    pub fn advance_by(&mut self, delta: Duration) -> usize {
        let target = self.scheduler.now() + delta;
        self.advance_to(target)
    }
}
