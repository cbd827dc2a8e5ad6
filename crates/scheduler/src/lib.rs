//! # Scheduler Crate
//!
//! Single-threaded task queue for the document event loop. Tasks are opaque
//! payloads tagged with the [`TaskSource`] that queued them; the owner pops
//! and runs them one at a time, in FIFO order.

#![forbid(unsafe_code)]

use std::collections::VecDeque;

// ─────────────────────────────────────────────────────────────────────────────
// TaskId
// ─────────────────────────────────────────────────────────────────────────────

/// Opaque identifier for a queued task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

// ─────────────────────────────────────────────────────────────────────────────
// TaskSource
// ─────────────────────────────────────────────────────────────────────────────

/// The origin of a task, used for debugging and per-source accounting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskSource {
    /// Document lifecycle (`DOMContentLoaded`, `load`).
    Dom,
    /// Style engine (animation events).
    Rendering,
    /// Work queued directly by scripts.
    Script,
}

/// A task popped from the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct Task<T> {
    pub id: TaskId,
    pub source: TaskSource,
    pub payload: T,
}

// ─────────────────────────────────────────────────────────────────────────────
// EventLoop
// ─────────────────────────────────────────────────────────────────────────────

/// A FIFO macro-task queue modeled after the HTML event loop. There are no
/// timers: every task is queued by something that already happened.
#[derive(Debug)]
pub struct EventLoop<T> {
    queue: VecDeque<Task<T>>,
    next_task_id: u64,
    completed: u64,
}

impl<T> Default for EventLoop<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventLoop<T> {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            next_task_id: 1,
            completed: 0,
        }
    }

    /// Queue a task; returns its id.
    pub fn post_task(&mut self, source: TaskSource, payload: T) -> TaskId {
        let id = TaskId(self.next_task_id);
        self.next_task_id += 1;
        self.queue.push_back(Task { id, source, payload });
        id
    }

    /// Dequeue the oldest task.
    pub fn next_task(&mut self) -> Option<Task<T>> {
        let task = self.queue.pop_front();
        if task.is_some() {
            self.completed += 1;
        }
        task
    }

    pub fn has_pending_work(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pending tasks from `source`.
    pub fn pending_from(&self, source: TaskSource) -> usize {
        self.queue.iter().filter(|t| t.source == source).count()
    }

    /// Tasks handed out by [`next_task`](Self::next_task) so far.
    pub fn completed(&self) -> u64 {
        self.completed
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_event_loop_is_empty() {
        let el: EventLoop<u32> = EventLoop::new();
        assert!(!el.has_pending_work());
        assert!(el.is_empty());
        assert_eq!(el.completed(), 0);
    }

    #[test]
    fn tasks_come_out_in_fifo_order() {
        let mut el = EventLoop::new();
        let a = el.post_task(TaskSource::Rendering, "a");
        let b = el.post_task(TaskSource::Dom, "b");
        assert!(a < b);
        assert_eq!(el.len(), 2);

        let first = el.next_task().unwrap();
        assert_eq!((first.id, first.source, first.payload), (a, TaskSource::Rendering, "a"));
        assert_eq!(el.next_task().unwrap().payload, "b");
        assert!(el.next_task().is_none());
        assert_eq!(el.completed(), 2);
    }

    #[test]
    fn pending_counts_per_source() {
        let mut el = EventLoop::new();
        el.post_task(TaskSource::Rendering, 1);
        el.post_task(TaskSource::Rendering, 2);
        el.post_task(TaskSource::Dom, 3);
        assert_eq!(el.pending_from(TaskSource::Rendering), 2);
        assert_eq!(el.pending_from(TaskSource::Dom), 1);
        assert_eq!(el.pending_from(TaskSource::Script), 0);
    }

    #[test]
    fn tasks_posted_while_draining_run_after_existing_ones() {
        let mut el = EventLoop::new();
        el.post_task(TaskSource::Dom, 1);
        el.post_task(TaskSource::Dom, 2);
        let mut order = Vec::new();
        while let Some(task) = el.next_task() {
            if task.payload == 1 {
                el.post_task(TaskSource::Script, 3);
            }
            order.push(task.payload);
        }
        assert_eq!(order, vec![1, 2, 3]);
    }
}
