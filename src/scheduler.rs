//! Timer scheduling port.
//!
//! The autosave coordinator never talks to wall-clock timers directly; it
//! schedules through this trait. Hosts implement [`Scheduler`] over their
//! own event loop. [`ManualScheduler`] is the deterministic in-crate
//! implementation: time only moves when `advance` is called, which makes
//! debounce behavior testable without real waits.
//!
//! Single-threaded: callbacks run on the caller's thread during
//! `advance`, and handles use `Rc`/`Cell` rather than atomics.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

pub type TimerCallback = Rc<RefCell<dyn FnMut()>>;

/// Cancellable handle to a scheduled timer. Cancelling an already-fired
/// one-shot timer is a no-op.
#[derive(Clone)]
pub struct TimerHandle {
    cancelled: Rc<Cell<bool>>,
}

impl TimerHandle {
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

pub trait Scheduler {
    /// Run `callback` once after `delay`.
    fn after(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;

    /// Run `callback` repeatedly, every `period`.
    fn every(&self, period: Duration, callback: TimerCallback) -> TimerHandle;
}

struct Timer {
    due: Duration,
    period: Option<Duration>,
    callback: TimerCallback,
    cancelled: Rc<Cell<bool>>,
}

#[derive(Default)]
struct SchedulerState {
    now: Duration,
    timers: Vec<Timer>,
}

/// Virtual-clock scheduler. `advance` moves time forward and fires due
/// timers in deadline order; callbacks run outside the internal borrow so
/// they may schedule or cancel freely.
#[derive(Default)]
pub struct ManualScheduler {
    state: RefCell<SchedulerState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    pub fn pending(&self) -> usize {
        self.state
            .borrow()
            .timers
            .iter()
            .filter(|t| !t.cancelled.get())
            .count()
    }

    pub fn advance(&self, by: Duration) {
        let target = self.state.borrow().now + by;
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                state.timers.retain(|t| !t.cancelled.get());

                let due_idx = state
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| t.due)
                    .map(|(i, _)| i);

                match due_idx {
                    Some(i) => {
                        state.now = state.timers[i].due.max(state.now);
                        match state.timers[i].period {
                            Some(period) => {
                                state.timers[i].due += period;
                                Some(Rc::clone(&state.timers[i].callback))
                            }
                            None => {
                                let timer = state.timers.swap_remove(i);
                                Some(timer.callback)
                            }
                        }
                    }
                    None => {
                        state.now = target;
                        None
                    }
                }
            };

            match next {
                Some(callback) => (callback.borrow_mut())(),
                None => break,
            }
        }
    }

    fn schedule(&self, delay: Duration, period: Option<Duration>, callback: TimerCallback) -> TimerHandle {
        let cancelled = Rc::new(Cell::new(false));
        let mut state = self.state.borrow_mut();
        let due = state.now + delay;
        state.timers.push(Timer {
            due,
            period,
            callback,
            cancelled: Rc::clone(&cancelled),
        });
        TimerHandle { cancelled }
    }
}

impl Scheduler for ManualScheduler {
    fn after(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        self.schedule(delay, None, callback)
    }

    fn every(&self, period: Duration, callback: TimerCallback) -> TimerHandle {
        self.schedule(period, Some(period), callback)
    }
}
