//! Coalescing task queue.
//!
//! Engine notifications arrive in bursts; each burst should cause at most one
//! reinstallation. Tasks are deduplicated while pending and released either
//! on the next tick (after the session has drained queued events) or on the
//! next idle notification.

use tracing::trace;

/// Deferred work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Reinstall,
    ReorderLayers,
}

/// When a task becomes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    NextTick,
    Idle,
}

impl Task {
    pub fn trigger(self) -> Trigger {
        match self {
            Task::Reinstall => Trigger::NextTick,
            Task::ReorderLayers => Trigger::Idle,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    pending: Vec<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task; returns `false` when it was already pending.
    pub fn schedule(&mut self, task: Task) -> bool {
        if self.pending.contains(&task) {
            trace!(task = ?task, "Task already pending");
            return false;
        }
        self.pending.push(task);
        true
    }

    /// Drop a pending task; returns `false` when it was not queued.
    pub fn cancel(&mut self, task: Task) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| *t != task);
        self.pending.len() != before
    }

    pub fn is_pending(&self, task: Task) -> bool {
        self.pending.contains(&task)
    }

    /// Remove and return every task due on `trigger`, in scheduling order.
    pub fn take(&mut self, trigger: Trigger) -> Vec<Task> {
        let (due, rest): (Vec<Task>, Vec<Task>) = self
            .pending
            .drain(..)
            .partition(|t| t.trigger() == trigger);
        self.pending = rest;
        due
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_coalesce() {
        let mut scheduler = Scheduler::new();
        assert!(scheduler.schedule(Task::Reinstall));
        assert!(!scheduler.schedule(Task::Reinstall));
        assert!(!scheduler.schedule(Task::Reinstall));
        assert_eq!(scheduler.take(Trigger::NextTick), vec![Task::Reinstall]);
        assert!(scheduler.take(Trigger::NextTick).is_empty());
    }

    #[test]
    fn test_take_only_due_tasks() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Task::ReorderLayers);
        scheduler.schedule(Task::Reinstall);

        assert_eq!(scheduler.take(Trigger::NextTick), vec![Task::Reinstall]);
        assert!(scheduler.is_pending(Task::ReorderLayers));
        assert_eq!(scheduler.take(Trigger::Idle), vec![Task::ReorderLayers]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Task::Reinstall);
        scheduler.schedule(Task::ReorderLayers);

        assert!(scheduler.cancel(Task::Reinstall));
        assert!(!scheduler.cancel(Task::Reinstall));
        assert!(scheduler.take(Trigger::NextTick).is_empty());
        assert!(scheduler.is_pending(Task::ReorderLayers));
    }
}
