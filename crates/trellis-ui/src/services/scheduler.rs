//! Event-loop timers backed by `setTimeout`.

use crate::core::scheduler::{Scheduler, Task, TimerGuard};
use gloo_timers::callback::Timeout;
use std::rc::Rc;

/// Scheduler that runs tasks on the browser event loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BrowserScheduler;

impl BrowserScheduler {
    /// Shared handle suitable for [`crate::core::countdown::Countdown::start`].
    #[must_use]
    pub fn shared() -> Rc<dyn Scheduler> {
        Rc::new(Self)
    }
}

impl Scheduler for BrowserScheduler {
    fn schedule(&self, delay_ms: u32, task: Task) -> TimerGuard {
        // Dropping a gloo `Timeout` clears it.
        TimerGuard::new(Timeout::new(delay_ms, task))
    }
}
