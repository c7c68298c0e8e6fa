//! Thread-safe player handle
//!
//! All state changes and the stale-tick check happen under one
//! `parking_lot::Mutex` per player. Handles are cheap to clone; separate
//! players share nothing.
//!
//! The lock is held while listeners run, so a listener must not call back into
//! the same handle.

use super::engine::TracePlayer;
use super::listeners::SubscriptionId;
use super::scheduler::TimerQueue;
use super::{PlaybackState, PlaybackStatus, PlayerConfig};
use crate::trace::{RawTraceStep, Trace, TraceError, TraceStep};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SharedTracePlayer {
    inner: Arc<Mutex<TracePlayer<TimerQueue>>>,
}

impl SharedTracePlayer {
    pub fn new(config: PlayerConfig) -> Self {
        SharedTracePlayer {
            inner: Arc::new(Mutex::new(TracePlayer::new(config))),
        }
    }

    pub fn load(&self, raw: &[RawTraceStep]) -> Result<(), TraceError> {
        self.inner.lock().load(raw)
    }

    pub fn load_trace(&self, trace: Trace) {
        self.inner.lock().load_trace(trace);
    }

    pub fn play(&self) {
        self.inner.lock().play();
    }

    pub fn pause(&self) {
        self.inner.lock().pause();
    }

    pub fn toggle(&self) {
        self.inner.lock().toggle();
    }

    pub fn seek(&self, index: i64) {
        self.inner.lock().seek(index);
    }

    /// Advance the player's clock to `elapsed` and apply due ticks
    pub fn pump(&self, elapsed: Duration) -> usize {
        self.inner.lock().advance_to(elapsed)
    }

    pub fn state(&self) -> PlaybackState {
        self.inner.lock().state()
    }

    pub fn status(&self) -> PlaybackStatus {
        self.inner.lock().status()
    }

    pub fn current_step(&self) -> Option<TraceStep> {
        self.inner.lock().current_step().cloned()
    }

    pub fn on_step_changed(
        &self,
        listener: impl FnMut(usize, &TraceStep) + Send + 'static,
    ) -> SubscriptionId {
        self.inner.lock().on_step_changed(listener)
    }

    pub fn on_line_changed(
        &self,
        listener: impl FnMut(Option<u32>) + Send + 'static,
    ) -> SubscriptionId {
        self.inner.lock().on_line_changed(listener)
    }

    pub fn on_finished(&self, listener: impl FnMut() + Send + 'static) -> SubscriptionId {
        self.inner.lock().on_finished(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.lock().unsubscribe(id)
    }

    /// Run `f` with exclusive access to the player
    pub fn with<R>(&self, f: impl FnOnce(&mut TracePlayer<TimerQueue>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl Default for SharedTracePlayer {
    fn default() -> Self {
        Self::new(PlayerConfig::default())
    }
}
