use std::{
    collections::VecDeque,
    sync::{Condvar, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use super::push_error::PushError;

struct QueueInner<T> {
    items: VecDeque<T>,
    max_count: usize,
}

impl<T> QueueInner<T> {
    // single eviction rule for every mutator: oldest out until len <= max_count
    fn evict_overflow(&mut self) -> Vec<T> {
        let mut evicted = Vec::new();
        while self.items.len() > self.max_count {
            if let Some(item) = self.items.pop_front() {
                evicted.push(item);
            }
        }
        evicted
    }
}

/// A FIFO buffer shared between producer and consumer threads, one mutex
/// guarding both the items and the capacity bound. Capacity defaults to
/// unbounded and may be changed at any time; overflowing inserts evict from
/// the front. Every operation acquires the lock exactly once, so each call
/// is atomic relative to all others.
pub struct CrossThreadQueue<T> {
    inner: Mutex<QueueInner<T>>,
    not_empty: Condvar,
}

impl<T> CrossThreadQueue<T> {
    pub fn new() -> Self {
        Self::with_max_count(usize::MAX)
    }

    pub fn with_max_count(max_count: usize) -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                items: VecDeque::new(),
                max_count,
            }),
            not_empty: Condvar::new(),
        }
    }

    // a poisoned lock still guards a structurally sound queue, mutators
    // restore the bound before returning
    fn lock(&self) -> MutexGuard<'_, QueueInner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the capacity bound, evicting oldest items until it holds.
    /// The evicted items are returned in eviction (FIFO) order.
    pub fn set_max_count(&self, max_count: usize) -> Vec<T> {
        let mut inner = self.lock();
        inner.max_count = max_count;
        inner.evict_overflow()
    }

    pub fn max_count(&self) -> usize {
        self.lock().max_count
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        let inner = self.lock();
        inner.items.len() >= inner.max_count
    }

    /// Inserts at the back iff there is room below the bound,
    /// otherwise hands the item back without mutating anything.
    pub fn try_push(&self, item: T) -> Result<(), PushError<T>> {
        let mut inner = self.lock();
        if inner.items.len() < inner.max_count {
            inner.items.push_back(item);
            self.not_empty.notify_one();
            Ok(())
        } else {
            Err(PushError::Full(item))
        }
    }

    /// All-or-nothing batch insert: either the whole batch fits below the
    /// bound, or the batch is handed back untouched.
    pub fn try_push_batch(&self, items: Vec<T>) -> Result<(), PushError<Vec<T>>> {
        let mut inner = self.lock();
        // len <= max_count always holds, the subtraction cannot underflow
        if items.len() > inner.max_count - inner.items.len() {
            return Err(PushError::Full(items));
        }

        for item in items {
            inner.items.push_back(item);
        }
        self.not_empty.notify_all();
        Ok(())
    }

    /// Unconditional insert. When the insert overflows the bound, the oldest
    /// item is evicted and returned; with a bound of 0 the pushed item
    /// itself comes straight back.
    pub fn push(&self, item: T) -> Option<T> {
        let mut inner = self.lock();
        inner.items.push_back(item);
        let evicted = if inner.items.len() > inner.max_count {
            inner.items.pop_front()
        } else {
            None
        };
        self.not_empty.notify_one();
        evicted
    }

    /// Unconditional batch insert, evicting after each item that overflows
    /// the bound. Returns all evicted items in eviction order.
    pub fn push_batch(&self, items: Vec<T>) -> Vec<T> {
        let mut inner = self.lock();
        let mut evicted = Vec::new();
        for item in items {
            inner.items.push_back(item);
            if inner.items.len() > inner.max_count {
                if let Some(old) = inner.items.pop_front() {
                    evicted.push(old);
                }
            }
        }
        self.not_empty.notify_all();
        evicted
    }

    pub fn pop(&self) -> Option<T> {
        self.lock().items.pop_front()
    }

    /// Removes and returns up to `count` front items in FIFO order,
    /// fewer (possibly none) when the queue holds less. Never blocks.
    pub fn pop_many(&self, count: usize) -> Vec<T> {
        let mut inner = self.lock();
        let count = count.min(inner.items.len());
        inner.items.drain(..count).collect()
    }

    /// Blocking pop: parks the caller until an item arrives or the timeout
    /// elapses. The lock is released while waiting, every insertion signals
    /// the waiters, and the timeout bounds the wait so a consumer is never
    /// stuck once producers are gone.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.lock();
        loop {
            if let Some(item) = inner.items.pop_front() {
                return Some(item);
            }

            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (guard, _) = self
                .not_empty
                .wait_timeout(inner, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            inner = guard;
        }
    }

    pub fn clear(&self) {
        self.lock().items.clear();
    }
}

impl<T: PartialEq> CrossThreadQueue<T> {
    /// Removes the first (oldest) item equal to `value`.
    /// The only operation that needs `PartialEq` on the payload.
    pub fn remove(&self, value: &T) -> bool {
        let mut inner = self.lock();
        match inner.items.iter().position(|item| item == value) {
            Some(index) => {
                inner.items.remove(index);
                true
            }
            None => false,
        }
    }
}

impl<T> Default for CrossThreadQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread, time::Duration};

    use super::*;

    fn drain_all(queue: &CrossThreadQueue<&'static str>) -> Vec<&'static str> {
        queue.pop_many(usize::MAX)
    }

    #[test]
    fn test_new_queue_is_unbounded_and_empty() {
        let queue: CrossThreadQueue<i32> = CrossThreadQueue::new();
        assert_eq!(queue.max_count(), usize::MAX);
        assert_eq!(queue.len(), 0);
        assert!(queue.is_empty());
        assert!(!queue.is_full());
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_push_evicts_oldest_at_capacity() {
        let queue = CrossThreadQueue::with_max_count(3);
        assert_eq!(queue.push("a"), None);
        assert_eq!(queue.push("b"), None);
        assert_eq!(queue.push("c"), None);
        assert!(queue.is_full());

        assert_eq!(queue.push("d"), Some("a"));
        assert_eq!(queue.len(), 3);
        assert_eq!(drain_all(&queue), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_try_push_rejects_when_full() {
        let queue = CrossThreadQueue::with_max_count(3);
        for item in ["b", "c", "d"] {
            assert!(queue.try_push(item).is_ok());
        }

        let rejected = queue.try_push("e");
        assert!(rejected.is_err());
        assert_eq!(rejected.unwrap_err().into_inner(), "e");
        assert_eq!(drain_all(&queue), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_pop_many_takes_front_in_order() {
        let queue = CrossThreadQueue::with_max_count(3);
        queue.push_batch(vec!["b", "c", "d"]);

        assert_eq!(queue.pop_many(2), vec!["b", "c"]);
        assert_eq!(queue.len(), 1);
        assert_eq!(drain_all(&queue), vec!["d"]);
        assert!(queue.pop_many(5).is_empty());
    }

    #[test]
    fn test_remove_first_match_only() {
        let queue = CrossThreadQueue::new();
        queue.push_batch(vec!["d", "e", "d"]);

        assert!(queue.remove(&"d"));
        assert_eq!(queue.len(), 2);
        assert!(!queue.remove(&"x"));
        assert_eq!(drain_all(&queue), vec!["e", "d"]);
    }

    #[test]
    fn test_set_max_count_shrink_evicts_oldest() {
        let queue = CrossThreadQueue::new();
        queue.push_batch(vec![1, 2, 3, 4, 5]);

        let evicted = queue.set_max_count(2);
        assert_eq!(evicted, vec![1, 2, 3]);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop_many(10), vec![4, 5]);
    }

    #[test]
    fn test_set_max_count_zero_drains_everything() {
        let queue = CrossThreadQueue::new();
        queue.push_batch(vec![1, 2, 3]);

        assert_eq!(queue.set_max_count(0), vec![1, 2, 3]);
        assert_eq!(queue.len(), 0);
        assert!(queue.is_full());
        assert!(queue.try_push(4).is_err());
        // an unconditional push on a zero bound bounces the item itself
        assert_eq!(queue.push(5), Some(5));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_try_push_batch_is_all_or_nothing() {
        let queue = CrossThreadQueue::with_max_count(4);
        queue.push_batch(vec![1, 2]);

        let rejected = queue.try_push_batch(vec![3, 4, 5]);
        assert!(rejected.is_err());
        assert_eq!(rejected.unwrap_err().into_inner(), vec![3, 4, 5]);
        assert_eq!(queue.len(), 2);

        assert!(queue.try_push_batch(vec![3, 4]).is_ok());
        assert_eq!(queue.pop_many(10), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_push_batch_evicts_per_item() {
        let queue = CrossThreadQueue::with_max_count(2);
        let evicted = queue.push_batch(vec![1, 2, 3, 4]);
        assert_eq!(evicted, vec![1, 2]);
        assert_eq!(queue.pop_many(10), vec![3, 4]);
    }

    #[test]
    fn test_clear_ignores_bound() {
        let queue = CrossThreadQueue::with_max_count(10);
        queue.push_batch(vec![1, 2, 3]);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.max_count(), 10);
    }

    #[test]
    fn test_size_never_exceeds_bound() {
        let queue = CrossThreadQueue::with_max_count(4);
        for i in 0..20 {
            queue.push(i);
            assert!(queue.len() <= queue.max_count());
        }
        queue.push_batch((20..40).collect());
        assert!(queue.len() <= queue.max_count());
        queue.set_max_count(1);
        assert!(queue.len() <= 1);
    }

    #[test]
    fn test_pop_timeout_expires_on_empty_queue() {
        let queue: CrossThreadQueue<i32> = CrossThreadQueue::new();
        let started = Instant::now();
        assert_eq!(queue.pop_timeout(Duration::from_millis(20)), None);
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_pop_timeout_wakes_on_push() {
        let queue = Arc::new(CrossThreadQueue::new());
        let producer_queue = queue.clone();
        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            producer_queue.push(42);
        });

        assert_eq!(queue.pop_timeout(Duration::from_secs(5)), Some(42));
        producer.join().unwrap();
    }
}
