//! Debounced write scheduling.
//!
//! Pending writes are coalesced by key: scheduling a key that is already
//! pending pushes its deadline back, so a burst of edits produces a single
//! write once the burst has been quiet for the full delay.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

/// Holds the scheduler suppressed until dropped.
#[derive(Debug)]
#[must_use = "suppression ends when the guard is dropped"]
pub struct SuppressGuard {
    depth: Rc<Cell<u32>>,
}

impl Drop for SuppressGuard {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

#[derive(Debug)]
pub struct WriteScheduler {
    delay: Duration,
    pending: Vec<(String, Instant)>,
    suppressed: Rc<Cell<u32>>,
}

impl WriteScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Vec::new(),
            suppressed: Rc::new(Cell::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Suppress scheduling until the returned guard is dropped. Guards nest.
    pub fn suppress(&self) -> SuppressGuard {
        self.suppressed.set(self.suppressed.get() + 1);
        SuppressGuard {
            depth: Rc::clone(&self.suppressed),
        }
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed.get() > 0
    }

    /// Schedule a write for `key` at `now + delay`. Returns false when
    /// suppressed.
    pub fn schedule(&mut self, key: &str, now: Instant) -> bool {
        if self.is_suppressed() {
            trace!(key, "write suppressed");
            return false;
        }
        let deadline = now + self.delay;
        match self.pending.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = deadline,
            None => self.pending.push((key.to_string(), deadline)),
        }
        true
    }

    /// Remove and return the keys whose deadline has passed.
    pub fn due(&mut self, now: Instant) -> Vec<String> {
        let mut due = Vec::new();
        self.pending.retain(|(key, deadline)| {
            if *deadline <= now {
                due.push(key.clone());
                false
            } else {
                true
            }
        });
        due
    }

    /// Remove and return every pending key regardless of deadline.
    pub fn drain(&mut self) -> Vec<String> {
        self.pending.drain(..).map(|(key, _)| key).collect()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|(_, deadline)| *deadline).min()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn bursts_coalesce_into_one_write() {
        let mut scheduler = WriteScheduler::new(DELAY);
        let t0 = Instant::now();
        for step in 0..5u64 {
            assert!(scheduler.schedule("p1", t0 + Duration::from_millis(step * 100)));
        }
        // last schedule at t0+400ms, so nothing is due before t0+700ms
        assert!(scheduler.due(t0 + Duration::from_millis(650)).is_empty());
        assert_eq!(scheduler.next_deadline(), Some(t0 + Duration::from_millis(700)));
        assert_eq!(scheduler.due(t0 + Duration::from_millis(700)), vec!["p1".to_string()]);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn suppression_is_scoped_to_the_guard() {
        let mut scheduler = WriteScheduler::new(DELAY);
        let now = Instant::now();
        {
            let _outer = scheduler.suppress();
            let inner = scheduler.suppress();
            drop(inner);
            assert!(!scheduler.schedule("p1", now));
        }
        assert!(!scheduler.is_suppressed());
        assert!(scheduler.schedule("p1", now));
        assert_eq!(scheduler.drain(), vec!["p1".to_string()]);
    }

    #[test]
    fn keys_are_tracked_separately() {
        let mut scheduler = WriteScheduler::new(DELAY);
        let t0 = Instant::now();
        scheduler.schedule("a", t0);
        scheduler.schedule("b", t0 + Duration::from_millis(200));
        assert_eq!(scheduler.due(t0 + DELAY), vec!["a".to_string()]);
        assert_eq!(scheduler.next_deadline(), Some(t0 + Duration::from_millis(500)));
    }
}
