//! Bounded circular quote buffer (one producer, many consumers)
//!
//! Classic monitor: one `parking_lot::Mutex` guarding the ring plus one
//! `Condvar` that consumers park on while the ring is empty.
//!
//! ```text
//!   producer ──try_enqueue──▶ [ r · · w ]  ──dequeue──▶ trader 1..N
//!              (drop if full)    count        (park while empty && !stop)
//! ```
//!
//! - Enqueue never blocks. A full ring rejects the incoming item (drop-new)
//!   and counts the drop.
//! - Every successful enqueue broadcasts. Which parked consumer wins the item
//!   is up to the scheduler; the losers re-check and park again.
//! - Consumers always re-check `count` and the stop token after waking.
//! - The lock is released while parked, so a parked consumer never blocks
//!   the producer.

use crate::core::StopToken;
use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use std::fmt;

/// Rejected enqueue; carries the item back to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueFull<T>(pub T);

impl<T> fmt::Display for QueueFull<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue full, item dropped")
    }
}

impl<T: fmt::Debug> std::error::Error for QueueFull<T> {}

/// Lifetime counters, read under the queue lock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub enqueued: u64,
    pub dequeued: u64,
    pub dropped: u64,
    /// Largest `len` ever observed
    pub high_water: usize,
}

struct Ring<T> {
    slots: Box<[Option<T>]>,
    read: usize,
    write: usize,
    count: usize,
    stats: QueueStats,
}

impl<T> Ring<T> {
    fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            read: 0,
            write: 0,
            count: 0,
            stats: QueueStats::default(),
        }
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn push(&mut self, item: T) -> Result<(), QueueFull<T>> {
        if self.count == self.capacity() {
            self.stats.dropped += 1;
            return Err(QueueFull(item));
        }

        self.slots[self.write] = Some(item);
        self.write = (self.write + 1) % self.capacity();
        self.count += 1;

        self.stats.enqueued += 1;
        self.stats.high_water = self.stats.high_water.max(self.count);
        Ok(())
    }

    fn pop(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }

        let item = self.slots[self.read].take();
        debug_assert!(item.is_some(), "live slot at read cursor was empty");

        self.read = (self.read + 1) % self.capacity();
        self.count -= 1;
        self.stats.dequeued += 1;
        item
    }
}

/// Fixed-capacity FIFO with blocking dequeue and drop-new enqueue
pub struct BoundedQueue<T> {
    ring: Mutex<Ring<T>>,
    ready: Condvar,
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` items
    ///
    /// # Panics
    /// Panics if `capacity` is zero. Configuration validation rejects that
    /// before a queue is ever built.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be positive");

        Self {
            ring: Mutex::new(Ring::new(capacity)),
            ready: Condvar::new(),
        }
    }

    /// Append without blocking
    ///
    /// On success all parked consumers are woken. When the ring is full the
    /// item is handed back in `QueueFull` and counted as dropped.
    pub fn try_enqueue(&self, item: T) -> Result<(), QueueFull<T>> {
        let mut ring = self.ring.lock();
        ring.push(item)?;
        self.ready.notify_all();
        Ok(())
    }

    /// Remove the oldest item, parking while the queue is empty
    ///
    /// Returns `None` only once `stop` is set and nothing is left to drain.
    /// Items enqueued before shutdown are still handed out.
    pub fn dequeue(&self, stop: &StopToken) -> Option<T> {
        let mut ring = self.ring.lock();
        loop {
            if let Some(item) = ring.pop() {
                return Some(item);
            }
            if stop.is_stopped() {
                return None;
            }
            self.ready.wait(&mut ring);
        }
    }

    /// Remove the oldest item if there is one
    pub fn try_dequeue(&self) -> Option<T> {
        self.ring.lock().pop()
    }

    /// Broadcast to every parked consumer so it re-evaluates its stop predicate
    ///
    /// Taking the lock first orders this after any consumer that checked the
    /// stop token but has not parked yet.
    pub fn wake_all(&self) {
        let _ring = self.ring.lock();
        self.ready.notify_all();
    }

    pub fn len(&self) -> usize {
        self.ring.lock().count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        let ring = self.ring.lock();
        ring.count == ring.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.ring.lock().capacity()
    }

    pub fn stats(&self) -> QueueStats {
        self.ring.lock().stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let queue = BoundedQueue::new(4);
        for i in 0..4 {
            queue.try_enqueue(i).unwrap();
        }

        let stop = StopToken::new();
        for i in 0..4 {
            assert_eq!(queue.dequeue(&stop), Some(i));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_capacity_one_drops_second_enqueue() {
        let queue = BoundedQueue::new(1);

        assert!(queue.try_enqueue("first").is_ok());
        assert_eq!(queue.try_enqueue("second"), Err(QueueFull("second")));

        assert_eq!(queue.len(), 1);
        assert!(queue.is_full());

        let stats = queue.stats();
        assert_eq!(stats.enqueued, 1);
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.high_water, 1);
    }

    #[test]
    fn test_cursors_wrap() {
        let queue = BoundedQueue::new(3);

        // Push and pop enough to wrap the cursors several times
        for round in 0..10 {
            queue.try_enqueue(round * 2).unwrap();
            queue.try_enqueue(round * 2 + 1).unwrap();
            assert_eq!(queue.try_dequeue(), Some(round * 2));
            assert_eq!(queue.try_dequeue(), Some(round * 2 + 1));
        }

        assert!(queue.is_empty());
        assert_eq!(queue.stats().dequeued, 20);
    }

    #[test]
    fn test_stopped_queue_still_drains() {
        let queue = BoundedQueue::new(2);
        queue.try_enqueue(7).unwrap();

        let stop = StopToken::new();
        stop.cancel();

        assert_eq!(queue.dequeue(&stop), Some(7));
        assert_eq!(queue.dequeue(&stop), None);
    }

    #[test]
    fn test_parked_consumer_woken_by_enqueue() {
        let queue = Arc::new(BoundedQueue::new(2));
        let stop = StopToken::new();

        let consumer = {
            let queue = Arc::clone(&queue);
            let stop = stop.clone();
            thread::spawn(move || queue.dequeue(&stop))
        };

        thread::sleep(Duration::from_millis(20));
        queue.try_enqueue(42).unwrap();

        assert_eq!(consumer.join().unwrap(), Some(42));
    }

    #[test]
    fn test_wake_all_releases_parked_consumers() {
        let queue: Arc<BoundedQueue<u32>> = Arc::new(BoundedQueue::new(2));
        let stop = StopToken::new();

        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let queue = Arc::clone(&queue);
                let stop = stop.clone();
                thread::spawn(move || queue.dequeue(&stop))
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        stop.cancel();
        queue.wake_all();

        for consumer in consumers {
            assert_eq!(consumer.join().unwrap(), None);
        }
    }

    #[test]
    #[should_panic(expected = "capacity must be positive")]
    fn test_zero_capacity_rejected() {
        let _ = BoundedQueue::<u8>::new(0);
    }
}
