//! Expiration Timers Module
//!
//! Pending cleanup timers for caches configured with a timeout.
//!
//! A timer is a deadline record rather than a running task. Timers fire in
//! deadline order whenever the owner asks for the due ones, which keeps all
//! mutation on the caller's thread.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

/// Queue position: deadline, then scheduling sequence to break ties.
type Slot = (Instant, u64);

// == Timer Queue ==
/// At most one pending timer per hash, ordered by deadline.
#[derive(Debug)]
pub struct TimerQueue {
    timeout: Duration,
    /// Hash -> its queue slot
    pending: HashMap<String, Slot>,
    queue: BTreeMap<Slot, String>,
    next_seq: u64,
}

impl TimerQueue {
    // == Constructor ==
    /// Creates an empty queue whose timers fire `timeout` after scheduling.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            pending: HashMap::new(),
            queue: BTreeMap::new(),
            next_seq: 0,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // == Schedule ==
    /// Schedules cleanup of `hash` at `now + timeout`.
    ///
    /// Any timer already pending for `hash` is cancelled first.
    ///
    /// Returns the new deadline, or `None` when `now + timeout` is beyond
    /// what `Instant` can represent; such a timer would never fire, so
    /// none is scheduled.
    pub fn schedule(&mut self, hash: &str, now: Instant) -> Option<Instant> {
        self.cancel(hash);

        let deadline = now.checked_add(self.timeout)?;
        let slot = (deadline, self.next_seq);
        self.next_seq += 1;

        self.queue.insert(slot, hash.to_string());
        self.pending.insert(hash.to_string(), slot);
        Some(deadline)
    }

    // == Cancel ==
    /// Cancels the timer pending for `hash`, if any.
    pub fn cancel(&mut self, hash: &str) -> bool {
        match self.pending.remove(hash) {
            Some(slot) => {
                self.queue.remove(&slot);
                true
            }
            None => false,
        }
    }

    // == Pop Due ==
    /// Removes and returns the earliest hash whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<String> {
        let (&slot, _) = self.queue.first_key_value()?;
        if slot.0 > now {
            return None;
        }
        let hash = self.queue.remove(&slot)?;
        self.pending.remove(&hash);
        Some(hash)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    #[allow(dead_code)]
    pub fn deadline(&self, hash: &str) -> Option<Instant> {
        self.pending.get(hash).map(|(deadline, _)| *deadline)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.queue.clear();
    }
}
