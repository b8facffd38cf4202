//! One-shot timers carrying a deferred action.
//!
//! The manager never reads the clock itself: callers pass `now` when starting
//! timers and when collecting expired ones. Hosts pump it from their event
//! loop; tests drive it with synthetic instants.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use slotmap::{new_key_type, SlotMap};

use crate::error::{Result, TimerError};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// An entry in the timer queue (min-heap by fire time).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other.fire_time.cmp(&self.fire_time)
    }
}

/// Manages pending one-shot timers, each carrying an action of type `A`.
pub struct TimerManager<A> {
    timers: SlotMap<TimerId, A>,
    queue: BinaryHeap<TimerQueueEntry>,
}

impl<A> TimerManager<A> {
    /// Create a new timer manager.
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
        }
    }

    /// Start a one-shot timer that fires `duration` after `now`.
    pub fn start_one_shot(&mut self, now: Instant, duration: Duration, action: A) -> TimerId {
        let fire_time = now + duration;
        let id = self.timers.insert(action);
        self.queue.push(TimerQueueEntry { id, fire_time });
        tracing::trace!(target: targets::TIMER, ?id, ?duration, "timer started");
        id
    }

    /// Stop and remove a timer, returning its action.
    pub fn stop(&mut self, id: TimerId) -> Result<A> {
        // Queue entries are left in place and skipped when popped.
        self.timers
            .remove(id)
            .ok_or_else(|| TimerError::InvalidTimerId.into())
    }

    /// Check if a timer is still pending.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Get the action of a pending timer.
    pub fn action(&self, id: TimerId) -> Option<&A> {
        self.timers.get(id)
    }

    /// Get the duration from `now` until the next timer fires, if any.
    pub fn time_until_next(&mut self, now: Instant) -> Option<Duration> {
        self.prune_front();
        self.queue
            .peek()
            .map(|entry| entry.fire_time.saturating_duration_since(now))
    }

    /// Remove and return every timer due at `now`, in fire order.
    #[tracing::instrument(skip(self), target = "horizon_autocomplete_core::timer", level = "trace")]
    pub fn process_expired(&mut self, now: Instant) -> Vec<(TimerId, A)> {
        let mut fired = Vec::new();

        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_time > now {
                break;
            }
            self.queue.pop();

            // Stopped timers leave stale entries behind.
            let Some(action) = self.timers.remove(entry.id) else {
                continue;
            };

            tracing::trace!(target: targets::TIMER, id = ?entry.id, "timer fired");
            fired.push((entry.id, action));
        }

        fired
    }

    /// Get the number of pending timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    fn prune_front(&mut self) {
        while let Some(entry) = self.queue.peek() {
            if self.timers.contains_key(entry.id) {
                break;
            }
            self.queue.pop();
        }
    }
}

impl<A> Default for TimerManager<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::fmt::Debug for TimerManager<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerManager")
            .field("active", &self.timers.len())
            .finish()
    }
}
