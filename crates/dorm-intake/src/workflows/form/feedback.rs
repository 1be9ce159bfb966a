use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::timer::{TimerHandle, TimerQueue, TimerTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

/// User-facing outcome message. Only one is visible at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

/// Owns the visible notification, its expiry, and any other deferred work
/// a form schedules (such as the post-submit reset).
#[derive(Debug)]
pub struct Feedback {
    notification: Option<Notification>,
    dismiss_timer: Option<TimerHandle>,
    timers: TimerQueue,
    ttl: Duration,
}

impl Feedback {
    pub fn new(ttl: Duration) -> Self {
        Self {
            notification: None,
            dismiss_timer: None,
            timers: TimerQueue::new(),
            ttl,
        }
    }

    /// Replace the current notification and restart the expiry window.
    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>, now: Instant) {
        if let Some(handle) = self.dismiss_timer.take() {
            self.timers.cancel(handle);
        }

        self.notification = Some(Notification {
            message: message.into(),
            kind,
        });
        self.dismiss_timer = Some(
            self.timers
                .schedule(TimerTask::DismissNotification, now + self.ttl),
        );
    }

    pub fn success(&mut self, message: impl Into<String>, now: Instant) {
        self.notify(NotificationKind::Success, message, now);
    }

    pub fn error(&mut self, message: impl Into<String>, now: Instant) {
        self.notify(NotificationKind::Error, message, now);
    }

    pub fn dismiss(&mut self) -> Option<Notification> {
        if let Some(handle) = self.dismiss_timer.take() {
            self.timers.cancel(handle);
        }
        self.notification.take()
    }

    pub fn current(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn schedule(&mut self, task: TimerTask, due: Instant) -> TimerHandle {
        self.timers.schedule(task, due)
    }

    /// Fire due timers. Notification expiry is applied here; every fired
    /// task is returned so the owner can apply its own.
    pub fn tick(&mut self, now: Instant) -> Vec<TimerTask> {
        let fired = self.timers.drain_due(now);
        let mut tasks = Vec::with_capacity(fired.len());

        for (handle, task) in fired {
            debug!(?task, "form timer fired");
            if task == TimerTask::DismissNotification && self.dismiss_timer == Some(handle) {
                self.dismiss_timer = None;
                self.notification = None;
            }
            tasks.push(task);
        }

        tasks
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Cancel every pending timer, returning how many were dropped.
    pub fn shutdown(&mut self) -> usize {
        self.dismiss_timer = None;
        self.timers.cancel_all()
    }
}
