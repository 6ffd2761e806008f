// crates/folio-core/src/helpers/timers.rs
//
// Cancelable deadline queue owned by each controller.
//
// Nothing here reads the clock: callers pass `now` into `expire()`. A timer
// that was cancelled (or cleared by `cancel_all` on teardown) can never be
// returned from `expire()`, which is what keeps late callbacks from mutating
// a torn-down controller.

use std::time::Instant;

/// Handle returned by `Timers::schedule`. Unique per queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<K> {
    id:       TimerId,
    deadline: Instant,
    key:      K,
}

#[derive(Debug)]
pub struct Timers<K> {
    next_id: u64,
    pending: Vec<Entry<K>>,
}

impl<K> Default for Timers<K> {
    fn default() -> Self {
        Self { next_id: 0, pending: Vec::new() }
    }
}

impl<K> Timers<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline: Instant, key: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Entry { id, deadline, key });
        id
    }

    /// Returns false when the timer already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|e| e.id != id);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|e| e.id == id)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|e| e.deadline).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return every timer due at `now`, earliest deadline first.
    /// Timers sharing a deadline come out in scheduling order.
    pub fn expire(&mut self, now: Instant) -> Vec<(TimerId, K)> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].deadline <= now {
                due.push(self.pending.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.deadline.cmp(&b.deadline).then(a.id.cmp(&b.id)));
        due.into_iter().map(|e| (e.id, e.key)).collect()
    }
}
