use std::time::Instant;

/// Deferred work a form schedules for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    DismissNotification,
    ResetForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct ScheduledTask {
    handle: TimerHandle,
    task: TimerTask,
    due: Instant,
}

/// Cancellable deadline queue driven by explicit `drain_due` calls.
///
/// Nothing sleeps here; the owner decides when to poll, which keeps the
/// workflows deterministic under test and lets a runtime driver wait on
/// [`TimerQueue::next_deadline`].
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    scheduled: Vec<ScheduledTask>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, task: TimerTask, due: Instant) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.scheduled.push(ScheduledTask { handle, task, due });
        handle
    }

    /// Returns `false` when the task already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.scheduled.len();
        self.scheduled.retain(|entry| entry.handle != handle);
        self.scheduled.len() != before
    }

    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.scheduled.len();
        self.scheduled.clear();
        cancelled
    }

    /// Remove and return every task due at `now`, earliest deadline first.
    pub fn drain_due(&mut self, now: Instant) -> Vec<(TimerHandle, TimerTask)> {
        let (mut due, pending): (Vec<_>, Vec<_>) = self
            .scheduled
            .drain(..)
            .partition(|entry| entry.due <= now);
        self.scheduled = pending;

        due.sort_by(|a, b| a.due.cmp(&b.due).then(a.handle.cmp(&b.handle)));
        due.into_iter()
            .map(|entry| (entry.handle, entry.task))
            .collect()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduled.iter().map(|entry| entry.due).min()
    }

    pub fn len(&self) -> usize {
        self.scheduled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scheduled.is_empty()
    }
}
