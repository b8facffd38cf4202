//! Query triggering with a trailing-edge debounce.
//!
//! Value-change signals restart a single pending timer; only the value of the
//! last signal in a burst reaches the resolver. Earlier pending values are
//! dropped, never queued.

use std::time::{Duration, Instant};

use horizon_autocomplete_core::logging::targets;
use horizon_autocomplete_core::{TimerId, TimerManager};

use crate::events::Key;

/// Default debounce window between the last keystroke and the lookup.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Whether a key-up with this key counts as a value change.
///
/// Navigation, commit and cancel keys are intercepted by the state machine
/// and never schedule a lookup.
pub fn is_value_change(key: &Key) -> bool {
    !matches!(key, Key::ArrowUp | Key::ArrowDown | Key::Enter | Key::Escape)
}

/// Trailing-edge debouncer for lookups.
///
/// The pending value lives in the timer's action, so firing yields exactly
/// the value that should be resolved.
#[derive(Debug)]
pub struct QueryTrigger {
    delay: Duration,
    pending: Option<TimerId>,
}

impl QueryTrigger {
    /// Create a trigger with the given debounce window.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// The debounce window.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Change the debounce window. Affects the next scheduled lookup.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Whether a debounced lookup is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record a value change at `now`, superseding any pending lookup.
    pub fn schedule<A>(
        &mut self,
        timers: &mut TimerManager<A>,
        now: Instant,
        action: A,
    ) -> TimerId {
        self.cancel(timers);
        let id = timers.start_one_shot(now, self.delay, action);
        self.pending = Some(id);
        tracing::trace!(target: targets::TRIGGER, delay = ?self.delay, "lookup debounced");
        id
    }

    /// Drop the pending lookup, if any.
    pub fn cancel<A>(&mut self, timers: &mut TimerManager<A>) {
        if let Some(id) = self.pending.take() {
            // Already fired or stopped timers are not an error here.
            let _ = timers.stop(id);
        }
    }

    /// Acknowledge that timer `id` fired. Returns `true` if it was the
    /// pending lookup.
    pub fn fired(&mut self, id: TimerId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

impl Default for QueryTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
