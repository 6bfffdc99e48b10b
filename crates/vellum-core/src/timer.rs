//! Cancellable one-shot timers for Vellum widgets.
//!
//! Widgets need delayed, cancellable events: a typeahead buffer that clears
//! after an idle period, a blur that is deferred by one frame. The
//! [`TimerQueue`] holds those pending events as payloads and hands back the
//! ones that are due when the host framework pumps it.
//!
//! There is deliberately no clock thread here. `Vellum` has no event loop of
//! its own; the embedding framework drives [`TimerQueue::drain_expired`]
//! from its tick, and tests drive [`TimerQueue::drain_expired_at`] with
//! explicit instants so no test ever sleeps.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use slotmap::{new_key_type, SlotMap};

use crate::error::{Result, TimerError};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a scheduled timer.
    pub struct TimerId;
}

/// Internal timer data.
#[derive(Debug)]
struct TimerData<T> {
    /// When this timer should fire.
    fire_at: Instant,
    /// The payload delivered when the timer fires.
    payload: T,
}

/// An entry in the timer queue (min-heap by fire time).
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    id: TimerId,
    fire_at: Instant,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other.fire_at.cmp(&self.fire_at)
    }
}

/// A queue of cancellable one-shot timers, each carrying a payload.
///
/// Scheduling returns a [`TimerId`] that can be used to cancel the timer
/// before it fires. A timer fires at most once; cancelled timers are
/// silently skipped when the queue is drained.
pub struct TimerQueue<T> {
    /// All pending timers.
    timers: SlotMap<TimerId, TimerData<T>>,
    /// Priority queue of pending fires (min-heap by fire time). May contain
    /// stale entries for cancelled timers; these are skipped on drain.
    queue: BinaryHeap<QueueEntry>,
}

impl<T> TimerQueue<T> {
    /// Create an empty timer queue.
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
        }
    }

    /// Schedule a payload to be delivered after `delay`.
    ///
    /// Returns the timer ID that can be used to cancel the timer.
    pub fn schedule(&mut self, delay: Duration, payload: T) -> TimerId {
        self.schedule_at(Instant::now() + delay, payload)
    }

    /// Schedule a payload to be delivered at an explicit instant.
    ///
    /// Useful in tests, where the clock is injected rather than read.
    pub fn schedule_at(&mut self, fire_at: Instant, payload: T) -> TimerId {
        let id = self.timers.insert(TimerData { fire_at, payload });
        self.queue.push(QueueEntry { id, fire_at });
        id
    }

    /// Cancel a pending timer.
    ///
    /// Returns an error if the timer has already fired or been cancelled.
    pub fn cancel(&mut self, id: TimerId) -> Result<()> {
        if self.timers.remove(id).is_some() {
            Ok(())
        } else {
            Err(TimerError::InvalidTimerId.into())
        }
    }

    /// Check whether a timer is still pending.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Get the number of pending timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Get the duration until the next timer fires, if any.
    pub fn time_until_next(&mut self, now: Instant) -> Option<Duration> {
        // Drop stale entries for cancelled timers from the front.
        while let Some(entry) = self.queue.peek() {
            if self.timers.contains_key(entry.id) {
                break;
            }
            self.queue.pop();
        }

        self.queue
            .peek()
            .map(|entry| entry.fire_at.saturating_duration_since(now))
    }

    /// Remove and return all timers due at the current time.
    pub fn drain_expired(&mut self) -> Vec<(TimerId, T)> {
        self.drain_expired_at(Instant::now())
    }

    /// Remove and return all timers due at `now`, in fire-time order.
    pub fn drain_expired_at(&mut self, now: Instant) -> Vec<(TimerId, T)> {
        let mut fired = Vec::new();

        while let Some(entry) = self.queue.peek() {
            if entry.fire_at > now {
                break;
            }

            let entry = self.queue.pop().expect("peeked entry must exist");

            // Skip entries whose timer was cancelled.
            let Some(data) = self.timers.remove(entry.id) else {
                continue;
            };

            tracing::trace!(target: targets::TIMER, id = ?entry.id, "timer fired");
            fired.push((entry.id, data.payload));
        }

        fired
    }

    /// Cancel every pending timer.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.queue.clear();
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for TimerQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerQueue")
            .field("active", &self.active_count())
            .finish()
    }
}
