//! Page lifecycle decisions: when to boot and what a `pagehide` should release.

use crate::timers::TimerRegistry;

pub const EXIT_EVENT: &str = "pagehide";

/// `document.readyState` is a plain string; anything past `"loading"` means the DOM is parsed.
pub fn dom_is_parsed(ready_state: &str) -> bool {
    ready_state != "loading"
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageExit {
    /// The document is going away for good.
    Unload,
    /// The document is entering the back/forward cache and may be shown again.
    Suspend,
}

impl PageExit {
    /// From `PageTransitionEvent.persisted`.
    pub fn from_persisted(persisted: bool) -> Self {
        if persisted {
            PageExit::Suspend
        } else {
            PageExit::Unload
        }
    }

    /// Whether cached lookups should be dropped too.
    pub fn clears_cache(self) -> bool {
        self == PageExit::Unload
    }
}

/// Cancels outstanding timers on a real unload and returns how many were cancelled.
///
/// A suspended page keeps its timers: pending debounces and speech sequences
/// resume when the page is restored.
pub fn release_timers(exit: PageExit, timers: &TimerRegistry) -> usize {
    match exit {
        PageExit::Unload => timers.cancel_all(),
        PageExit::Suspend => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use std::cell::Cell;
    use std::rc::Rc;

    use crate::mascot::SpeechMachine;
    use crate::timers::ScheduledTimer;
    use crate::toc::ScrollDebounce;

    /// Runs its completion when "fired"; cancelling drops it unrun.
    struct PendingCompletion {
        cancelled: Rc<Cell<bool>>,
    }

    impl ScheduledTimer for PendingCompletion {
        fn cancel(self: Box<Self>) {
            self.cancelled.set(true);
        }
    }

    #[test]
    fn ready_state_strings() {
        assert!(!dom_is_parsed("loading"));
        assert!(dom_is_parsed("interactive"));
        assert!(dom_is_parsed("complete"));
    }

    #[test]
    fn persisted_pagehide_is_a_suspend() {
        assert_eq!(PageExit::from_persisted(true), PageExit::Suspend);
        assert_eq!(PageExit::from_persisted(false), PageExit::Unload);
        assert!(!PageExit::Suspend.clears_cache());
        assert!(PageExit::Unload.clears_cache());
    }

    #[test]
    fn suspended_page_recovers_scroll_spy_and_speech() {
        let timers = TimerRegistry::new();
        let debounce = ScrollDebounce::default();
        let speech = SpeechMachine::default();
        let cancelled = Rc::new(Cell::new(false));

        assert!(debounce.request());
        assert!(speech.try_begin());
        timers.track(Box::new(PendingCompletion { cancelled: cancelled.clone() }));
        timers.track(Box::new(PendingCompletion { cancelled: cancelled.clone() }));

        assert_eq!(release_timers(PageExit::Suspend, &timers), 0);
        assert_eq!(timers.outstanding(), 2);
        assert!(!cancelled.get());

        // restored page: the kept timers fire and complete their work
        debounce.complete();
        speech.finish();
        assert!(debounce.request());
        assert!(speech.try_begin());
    }

    #[test]
    fn unload_cancels_everything() {
        let timers = TimerRegistry::new();
        let cancelled = Rc::new(Cell::new(false));
        timers.track(Box::new(PendingCompletion { cancelled: cancelled.clone() }));
        assert_eq!(release_timers(PageExit::Unload, &timers), 1);
        assert!(cancelled.get());
        assert_eq!(timers.outstanding(), 0);
    }
}
