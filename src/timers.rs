//! Handle-tracking wrapper around timeouts and intervals.
//!
//! Every timer a page behavior schedules goes through a [`TimerRegistry`] so the
//! page controller can cancel whatever is still outstanding when the page is
//! torn down.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

pub type TimerId = u32;

/// A scheduled timer that can be cancelled exactly once.
pub trait ScheduledTimer {
    fn cancel(self: Box<Self>);

    /// One-shot timers report `true` after firing so the registry can prune them.
    fn is_finished(&self) -> bool {
        false
    }
}

pub struct TimerRegistry {
    next_id: Cell<TimerId>,
    live: RefCell<BTreeMap<TimerId, Box<dyn ScheduledTimer>>>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            live: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn track(&self, timer: Box<dyn ScheduledTimer>) -> TimerId {
        self.prune_finished();
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1).max(1));
        self.live.borrow_mut().insert(id, timer);
        id
    }

    /// Cancels one timer; returns `false` if it was unknown or already cancelled.
    pub fn cancel(&self, id: TimerId) -> bool {
        let removed = self.live.borrow_mut().remove(&id);
        match removed {
            Some(timer) => {
                timer.cancel();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) -> usize {
        let drained = std::mem::take(&mut *self.live.borrow_mut());
        let count = drained.len();
        for (_, timer) in drained {
            timer.cancel();
        }
        count
    }

    pub fn outstanding(&self) -> usize {
        self.prune_finished();
        self.live.borrow().len()
    }

    fn prune_finished(&self) {
        let finished: Vec<Box<dyn ScheduledTimer>> = {
            let mut live = self.live.borrow_mut();
            let ids: Vec<TimerId> = live
                .iter()
                .filter(|(_, timer)| timer.is_finished())
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter().filter_map(|id| live.remove(&id)).collect()
        };
        // dropped outside the borrow: a timer's drop may re-enter the registry
        drop(finished);
    }
}

impl Default for TimerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::Cell;
    use std::rc::Rc;

    use gloo_timers::callback::{Interval, Timeout};

    use super::{ScheduledTimer, TimerId, TimerRegistry};

    struct TrackedTimeout {
        timeout: Timeout,
        fired: Rc<Cell<bool>>,
    }

    impl ScheduledTimer for TrackedTimeout {
        fn cancel(self: Box<Self>) {
            let _ = self.timeout.cancel();
        }

        fn is_finished(&self) -> bool {
            self.fired.get()
        }
    }

    struct TrackedInterval(Interval);

    impl ScheduledTimer for TrackedInterval {
        fn cancel(self: Box<Self>) {
            let _ = self.0.cancel();
        }
    }

    impl TimerRegistry {
        pub fn set_timeout<F>(&self, millis: u32, callback: F) -> TimerId
        where
            F: FnOnce() + 'static,
        {
            let fired = Rc::new(Cell::new(false));
            let fired_flag = fired.clone();
            let timeout = Timeout::new(millis, move || {
                fired_flag.set(true);
                callback();
            });
            self.track(Box::new(TrackedTimeout { timeout, fired }))
        }

        pub fn set_interval<F>(&self, millis: u32, callback: F) -> TimerId
        where
            F: FnMut() + 'static,
        {
            self.track(Box::new(TrackedInterval(Interval::new(millis, callback))))
        }
    }
}
