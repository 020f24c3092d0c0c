//! Timer seam shared by the countdown and the realtime channel.
//!
//! # Design
//! - Timers are one-shot; repeating behaviour is built by rescheduling.
//! - Dropping a [`TimerGuard`] cancels the timer if it has not fired yet.
//! - [`ManualScheduler`] drives a virtual clock so timing logic is testable
//!   without a browser.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Deferred work handed to a scheduler.
pub type Task = Box<dyn FnOnce()>;

/// Something that can run a task after a delay on the current event loop.
pub trait Scheduler {
    /// Run `task` once after `delay_ms` milliseconds.
    ///
    /// The returned guard cancels the task when dropped before it fires.
    fn schedule(&self, delay_ms: u32, task: Task) -> TimerGuard;
}

/// Cancellation handle for a scheduled task.
#[must_use = "dropping the guard cancels the timer"]
pub struct TimerGuard {
    _inner: Box<dyn Any>,
}

impl TimerGuard {
    /// Wrap a platform handle whose `Drop` cancels the underlying timer.
    #[must_use]
    pub fn new(inner: impl Any) -> Self {
        Self {
            _inner: Box::new(inner),
        }
    }
}

impl std::fmt::Debug for TimerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TimerGuard")
    }
}

#[derive(Default)]
struct ManualClock {
    now_ms: u64,
    next_seq: u64,
    // Keyed by (due time, insertion order) so equal deadlines run FIFO.
    queue: BTreeMap<(u64, u64), Task>,
}

/// Virtual-clock scheduler for deterministic tests and headless use.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Rc<RefCell<ManualClock>>,
}

impl ManualScheduler {
    /// Create a scheduler with the clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.clock.borrow().now_ms
    }

    /// Number of tasks still waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.clock.borrow().queue.len()
    }

    /// Move the clock forward, running every task that becomes due in order.
    ///
    /// Tasks scheduled while advancing run too when their deadline falls
    /// inside the window.
    pub fn advance(&self, ms: u64) {
        let target = self.clock.borrow().now_ms.saturating_add(ms);
        loop {
            let next = {
                let mut clock = self.clock.borrow_mut();
                let due = clock
                    .queue
                    .first_key_value()
                    .map(|(key, _)| *key)
                    .filter(|(due, _)| *due <= target);
                due.and_then(|key| {
                    clock.now_ms = key.0;
                    clock.queue.remove(&key)
                })
            };
            match next {
                Some(task) => task(),
                None => break,
            }
        }
        self.clock.borrow_mut().now_ms = target;
    }

    /// Run due tasks until the queue is empty or `max_ms` of virtual time passed.
    pub fn run_for(&self, max_ms: u64) {
        let deadline = self.now_ms().saturating_add(max_ms);
        while self.pending() > 0 && self.now_ms() < deadline {
            let next_due = self
                .clock
                .borrow()
                .queue
                .first_key_value()
                .map_or(deadline, |((due, _), _)| (*due).min(deadline));
            self.advance(next_due.saturating_sub(self.now_ms()).max(1));
        }
    }
}

struct ManualEntry {
    clock: std::rc::Weak<RefCell<ManualClock>>,
    key: (u64, u64),
}

impl Drop for ManualEntry {
    fn drop(&mut self) {
        let Some(clock) = self.clock.upgrade() else {
            return;
        };
        // Drop the task outside the borrow; it may own other guards.
        let removed = clock
            .try_borrow_mut()
            .ok()
            .and_then(|mut clock| clock.queue.remove(&self.key));
        drop(removed);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay_ms: u32, task: Task) -> TimerGuard {
        let mut clock = self.clock.borrow_mut();
        let key = (clock.now_ms.saturating_add(u64::from(delay_ms)), clock.next_seq);
        clock.next_seq = clock.next_seq.wrapping_add(1);
        clock.queue.insert(key, task);
        TimerGuard::new(ManualEntry {
            clock: Rc::downgrade(&self.clock),
            key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn tasks_run_in_deadline_order() {
        let scheduler = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = {
            let log = log.clone();
            scheduler.schedule(20, Box::new(move || log.borrow_mut().push("late")))
        };
        let second = {
            let log = log.clone();
            scheduler.schedule(10, Box::new(move || log.borrow_mut().push("early")))
        };
        scheduler.advance(25);
        assert_eq!(*log.borrow(), vec!["early", "late"]);
        assert_eq!(scheduler.now_ms(), 25);
        drop((first, second));
    }

    #[test]
    fn dropping_guard_cancels_task() {
        let scheduler = ManualScheduler::new();
        let fired = Rc::new(Cell::new(false));
        let guard = {
            let fired = fired.clone();
            scheduler.schedule(5, Box::new(move || fired.set(true)))
        };
        drop(guard);
        scheduler.advance(10);
        assert!(!fired.get());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn tasks_scheduled_while_advancing_can_fire() {
        let scheduler = ManualScheduler::new();
        let hits = Rc::new(Cell::new(0));
        let keep = Rc::new(RefCell::new(Vec::new()));
        let outer = {
            let scheduler = scheduler.clone();
            let hits = hits.clone();
            let keep = keep.clone();
            scheduler.clone().schedule(
                10,
                Box::new(move || {
                    hits.set(hits.get() + 1);
                    let hits = hits.clone();
                    let guard =
                        scheduler.schedule(10, Box::new(move || hits.set(hits.get() + 1)));
                    keep.borrow_mut().push(guard);
                }),
            )
        };
        scheduler.advance(15);
        assert_eq!(hits.get(), 1);
        scheduler.advance(5);
        assert_eq!(hits.get(), 2);
        drop(outer);
    }
}
