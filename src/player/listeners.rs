//! Subscriber registry for playback notifications
//!
//! Three independent channels: step changes, current-line changes and end of
//! playback. Listeners run synchronously, in subscription order, while the
//! player is still borrowed, so they must not call back into it.

use crate::trace::TraceStep;

pub type StepListener = Box<dyn FnMut(usize, &TraceStep) + Send>;
pub type LineListener = Box<dyn FnMut(Option<u32>) + Send>;
pub type FinishedListener = Box<dyn FnMut() + Send>;

/// Handle returned by every `on_*` subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    step: Vec<(SubscriptionId, StepListener)>,
    line: Vec<(SubscriptionId, LineListener)>,
    finished: Vec<(SubscriptionId, FinishedListener)>,
}

impl Listeners {
    fn next_id(&mut self) -> SubscriptionId {
        self.next_id += 1;
        SubscriptionId(self.next_id)
    }

    pub(crate) fn add_step(&mut self, listener: StepListener) -> SubscriptionId {
        let id = self.next_id();
        self.step.push((id, listener));
        id
    }

    pub(crate) fn add_line(&mut self, listener: LineListener) -> SubscriptionId {
        let id = self.next_id();
        self.line.push((id, listener));
        id
    }

    pub(crate) fn add_finished(&mut self, listener: FinishedListener) -> SubscriptionId {
        let id = self.next_id();
        self.finished.push((id, listener));
        id
    }

    /// Returns false if `id` was not subscribed
    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.len();
        self.step.retain(|(sub, _)| *sub != id);
        self.line.retain(|(sub, _)| *sub != id);
        self.finished.retain(|(sub, _)| *sub != id);
        self.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.step.len() + self.line.len() + self.finished.len()
    }

    pub(crate) fn emit_step(&mut self, index: usize, step: &TraceStep) {
        for (_, listener) in &mut self.step {
            listener(index, step);
        }
    }

    pub(crate) fn emit_line(&mut self, line: Option<u32>) {
        for (_, listener) in &mut self.line {
            listener(line);
        }
    }

    pub(crate) fn emit_finished(&mut self) {
        for (_, listener) in &mut self.finished {
            listener();
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("step", &self.step.len())
            .field("line", &self.line.len())
            .field("finished", &self.finished.len())
            .finish()
    }
}
