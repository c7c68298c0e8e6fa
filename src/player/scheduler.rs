//! Tick scheduling
//!
//! The player never sleeps or spawns timers itself. It asks a [`Scheduler`] to
//! call back later with a [`TickToken`], and the host delivers that token to
//! [`TracePlayer::on_tick`](super::TracePlayer::on_tick) when it is due.
//!
//! [`TimerQueue`] is the scheduler used by the replay viewer and the tests: a
//! virtual clock that the host moves forward explicitly.

use std::time::Duration;

/// Identifies one scheduled tick.
///
/// `generation` changes on every trace load; `serial` changes on every
/// scheduled tick. The player only honours the single token it is waiting
/// for, so a tick captured before a load, pause or seek is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickToken {
    pub generation: u64,
    pub serial: u64,
}

/// Something that can deliver a token back after a delay
pub trait Scheduler {
    /// Arrange for `token` to be delivered once `delay` has passed
    fn schedule(&mut self, delay: Duration, token: TickToken);

    /// Drop a scheduled token if it has not fired yet
    fn cancel(&mut self, token: TickToken);
}

/// Deterministic virtual-time scheduler
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    now: Duration,
    pending: Vec<(Duration, TickToken)>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of tokens waiting to fire
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Time at which the earliest pending token fires
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.iter().map(|(due, _)| *due).min()
    }

    /// Move the clock to `elapsed` and return every token that is now due,
    /// earliest first. The clock never runs backwards.
    pub fn advance_to(&mut self, elapsed: Duration) -> Vec<TickToken> {
        self.now = self.now.max(elapsed);

        let now = self.now;
        let mut due: Vec<(Duration, TickToken)> = Vec::new();
        self.pending.retain(|&(at, token)| {
            if at <= now {
                due.push((at, token));
                false
            } else {
                true
            }
        });
        due.sort();
        due.into_iter().map(|(_, token)| token).collect()
    }

    /// Move the clock forward by `delta`
    pub fn advance_by(&mut self, delta: Duration) -> Vec<TickToken> {
        self.advance_to(self.now + delta)
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&mut self, delay: Duration, token: TickToken) {
        self.pending.push((self.now + delay, token));
    }

    fn cancel(&mut self, token: TickToken) {
        self.pending.retain(|&(_, pending)| pending != token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(serial: u64) -> TickToken {
        TickToken {
            generation: 1,
            serial,
        }
    }

    #[test]
    fn test_due_tokens_in_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(Duration::from_millis(300), token(2));
        queue.schedule(Duration::from_millis(100), token(1));
        queue.schedule(Duration::from_millis(900), token(3));

        let due = queue.advance_to(Duration::from_millis(500));
        assert_eq!(due, vec![token(1), token(2)]);
        assert_eq!(queue.pending(), 1);
        assert_eq!(queue.next_due(), Some(Duration::from_millis(900)));
    }

    #[test]
    fn test_cancelled_token_never_fires() {
        let mut queue = TimerQueue::new();
        queue.schedule(Duration::from_secs(1), token(1));
        queue.cancel(token(1));
        assert!(queue.advance_by(Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn test_clock_does_not_run_backwards() {
        let mut queue = TimerQueue::new();
        queue.advance_to(Duration::from_secs(3));
        queue.advance_to(Duration::from_secs(1));
        assert_eq!(queue.now(), Duration::from_secs(3));

        // Delays are measured from the current virtual time
        queue.schedule(Duration::from_secs(1), token(1));
        assert_eq!(queue.next_due(), Some(Duration::from_secs(4)));
    }
}
