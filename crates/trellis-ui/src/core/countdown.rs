//! Descending integer countdown driven by a [`Scheduler`].
//!
//! # Design
//! - `on_tick` fires immediately with the start value, then once per tick.
//! - The destination value is never ticked; reaching it fires `on_done` once.
//! - At most one step is ever scheduled. `stop` drops the pending timer and
//!   bumps a generation counter so a step already running cannot reschedule.

use crate::core::scheduler::{Scheduler, TimerGuard};
use serde::Deserialize;
use std::cell::RefCell;
use std::rc::Rc;
use yew::Callback;

/// Serializable countdown settings (values only, no callbacks).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CountdownSettings {
    /// First value passed to `on_tick`.
    pub start: i64,
    /// Value at which the countdown completes (never ticked).
    pub end: i64,
    /// Delay between ticks in milliseconds.
    pub tick_rate_ms: u32,
    /// Start ticking immediately.
    pub running: bool,
    /// Force console notifications on or off.
    pub verbose: Option<bool>,
}

impl Default for CountdownSettings {
    fn default() -> Self {
        Self {
            start: 5,
            end: 0,
            tick_rate_ms: 1_000,
            running: true,
            verbose: None,
        }
    }
}

/// Countdown configuration with observer callbacks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CountdownConfig {
    /// Numeric settings.
    pub settings: CountdownSettings,
    /// Receives `(current, destination)` on every tick.
    pub on_tick: Option<Callback<(i64, i64)>>,
    /// Fires once when the destination is reached.
    pub on_done: Option<Callback<()>>,
}

impl CountdownConfig {
    /// Config counting from `start` down to `end`.
    #[must_use]
    pub fn new(start: i64, end: i64) -> Self {
        Self {
            settings: CountdownSettings {
                start,
                end,
                ..CountdownSettings::default()
            },
            ..Self::default()
        }
    }

    /// Replace the tick interval.
    #[must_use]
    pub fn tick_rate_ms(mut self, ms: u32) -> Self {
        self.settings.tick_rate_ms = ms;
        self
    }

    /// Choose whether the countdown starts ticking right away.
    #[must_use]
    pub fn running(mut self, running: bool) -> Self {
        self.settings.running = running;
        self
    }

    /// Force verbose logging on or off.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.settings.verbose = Some(verbose);
        self
    }

    /// Attach the tick observer.
    #[must_use]
    pub fn on_tick(mut self, callback: Callback<(i64, i64)>) -> Self {
        self.on_tick = Some(callback);
        self
    }

    /// Attach the completion observer.
    #[must_use]
    pub fn on_done(mut self, callback: Callback<()>) -> Self {
        self.on_done = Some(callback);
        self
    }

    fn resolved_verbose(&self) -> bool {
        self.settings
            .verbose
            .unwrap_or(self.on_tick.is_none() && self.on_done.is_none())
    }
}

struct CountdownState {
    current: i64,
    end: i64,
    tick_rate_ms: u32,
    running: bool,
    finished: bool,
    generation: u64,
    verbose: bool,
    pending: Option<TimerGuard>,
    on_tick: Option<Callback<(i64, i64)>>,
    on_done: Option<Callback<()>>,
}

struct Shared {
    state: RefCell<CountdownState>,
    scheduler: Rc<dyn Scheduler>,
}

/// Handle to a running (or paused) countdown.
///
/// Cloning shares the same countdown. Dropping every handle does not stop a
/// countdown that is still scheduled; call [`Countdown::stop`] for that.
#[derive(Clone)]
pub struct Countdown {
    shared: Rc<Shared>,
}

impl Countdown {
    /// Create a countdown and, unless configured paused, take the first step.
    #[must_use]
    pub fn start(config: CountdownConfig, scheduler: Rc<dyn Scheduler>) -> Self {
        let verbose = config.resolved_verbose();
        let settings = config.settings;
        let countdown = Self {
            shared: Rc::new(Shared {
                state: RefCell::new(CountdownState {
                    current: settings.start,
                    end: settings.end,
                    tick_rate_ms: settings.tick_rate_ms,
                    running: settings.running,
                    finished: false,
                    generation: 0,
                    verbose,
                    pending: None,
                    on_tick: config.on_tick,
                    on_done: config.on_done,
                }),
                scheduler,
            }),
        };
        if settings.running {
            step(&countdown.shared);
        }
        countdown
    }

    /// Halt ticking; the current value is kept for [`Countdown::resume`].
    pub fn stop(&self) {
        let pending = {
            let mut state = self.shared.state.borrow_mut();
            state.running = false;
            state.generation = state.generation.wrapping_add(1);
            state.pending.take()
        };
        drop(pending);
    }

    /// Continue from the current value, ticking it again immediately.
    pub fn resume(&self) {
        {
            let mut state = self.shared.state.borrow_mut();
            if state.running || state.finished {
                return;
            }
            state.running = true;
        }
        step(&self.shared);
    }

    /// Next value that will be ticked (or the destination once finished).
    #[must_use]
    pub fn current(&self) -> i64 {
        self.shared.state.borrow().current
    }

    /// Destination value.
    #[must_use]
    pub fn destination(&self) -> i64 {
        self.shared.state.borrow().end
    }

    /// Whether a step is scheduled or in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.state.borrow().running
    }

    /// Whether `on_done` has fired.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.shared.state.borrow().finished
    }
}

impl std::fmt::Debug for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("Countdown")
            .field("current", &state.current)
            .field("end", &state.end)
            .field("running", &state.running)
            .field("finished", &state.finished)
            .finish_non_exhaustive()
    }
}

enum Step {
    Tick {
        value: i64,
        end: i64,
        generation: u64,
        on_tick: Option<Callback<(i64, i64)>>,
    },
    Done(Option<Callback<()>>),
    Idle,
}

fn step(shared: &Rc<Shared>) {
    let next = {
        let mut state = shared.state.borrow_mut();
        if !state.running {
            Step::Idle
        } else if state.current > state.end {
            let value = state.current;
            state.current -= 1;
            if state.verbose {
                tracing::info!(current = value, destination = state.end, "countdown tick");
            }
            Step::Tick {
                value,
                end: state.end,
                generation: state.generation,
                on_tick: state.on_tick.clone(),
            }
        } else {
            state.running = false;
            state.finished = true;
            state.current = state.end;
            if state.verbose {
                tracing::info!("countdown complete");
            }
            Step::Done(state.on_done.clone())
        }
    };

    match next {
        Step::Idle => {}
        Step::Done(on_done) => {
            if let Some(on_done) = on_done {
                on_done.emit(());
            }
        }
        Step::Tick {
            value,
            end,
            generation,
            on_tick,
        } => {
            if let Some(on_tick) = on_tick {
                on_tick.emit((value, end));
            }
            schedule_next(shared, generation);
        }
    }
}

fn schedule_next(shared: &Rc<Shared>, generation: u64) {
    let delay = {
        let state = shared.state.borrow();
        // A stop (and possibly resume) inside the tick callback owns scheduling now.
        if !state.running || state.generation != generation {
            return;
        }
        state.tick_rate_ms
    };
    let task_shared = Rc::clone(shared);
    let guard = shared.scheduler.schedule(
        delay,
        Box::new(move || {
            let fired = task_shared.state.borrow_mut().pending.take();
            drop(fired);
            step(&task_shared);
        }),
    );
    let replaced = shared.state.borrow_mut().pending.replace(guard);
    drop(replaced);
}
