//! Producer half of an SPSC queue.

use core::ops::Deref;

use crate::error::PushError;
use crate::queue::SpscQueue;
use crate::storage::Storage;
use crate::sync::{spin_loop, Ordering};

/// Write end of a [`SpscQueue`].
///
/// There is exactly one producer per queue. It keeps a private copy of the
/// consumer's cursor and only reloads the shared one when that copy says the
/// queue is full.
///
/// `Q` is `&SpscQueue` (from [`SpscQueue::split`]) or `Arc<SpscQueue>` (from
/// [`SpscQueue::into_split`]).
pub struct Producer<Q> {
    queue: Q,
    /// last observed `read_index`; producer-owned.
    read_index_cache: usize,
}

impl<T, S, Q> Producer<Q>
where
    S: Storage<T>,
    Q: Deref<Target = SpscQueue<T, S>>,
{
    pub(crate) fn new(queue: Q) -> Self {
        let read_index_cache = queue.read_index.load(Ordering::Acquire);
        Producer {
            queue,
            read_index_cache,
        }
    }

    /// Push a value, spinning while the queue is full.
    ///
    /// Busy-waits without yielding. Never call it after the consumer has
    /// stopped for good; poll [`try_push`](Self::try_push) instead.
    ///
    /// # example
    ///
    /// ```
    /// use turbo_spsc::SpscQueue;
    ///
    /// let mut queue = SpscQueue::<i32>::new(4).unwrap();
    /// let (mut tx, mut rx) = queue.split();
    /// tx.push(42);
    /// assert_eq!(rx.try_pop(), Some(42));
    /// ```
    #[inline]
    pub fn push(&mut self, value: T) {
        self.emplace_with(|| value)
    }

    /// Construct an element in the next free slot, spinning while the queue
    /// is full. `make` runs once space is available.
    #[inline]
    pub fn emplace_with<F>(&mut self, make: F)
    where
        F: FnOnce() -> T,
    {
        let write = self.queue.write_index.load(Ordering::Relaxed);
        let next = self.queue.next_index(write);
        self.wait_for_space(next);
        self.publish(write, next, make());
    }

    /// Push a value if there is room.
    ///
    /// # errors
    ///
    /// [`PushError`] holding `value` if the queue is full. The queue is left
    /// untouched.
    ///
    /// # example
    ///
    /// ```
    /// use turbo_spsc::{PushError, SpscQueue};
    ///
    /// let mut queue = SpscQueue::<i32>::new(1).unwrap();
    /// let (mut tx, _rx) = queue.split();
    /// assert!(tx.try_push(1).is_ok());
    /// assert_eq!(tx.try_push(2), Err(PushError(2)));
    /// ```
    #[inline]
    pub fn try_push(&mut self, value: T) -> Result<(), PushError<T>> {
        match self.try_reserve() {
            Some((write, next)) => {
                self.publish(write, next, value);
                Ok(())
            }
            None => Err(PushError(value)),
        }
    }

    /// Construct an element if there is room. `make` only runs on success.
    #[inline]
    pub fn try_emplace_with<F>(&mut self, make: F) -> bool
    where
        F: FnOnce() -> T,
    {
        match self.try_reserve() {
            Some((write, next)) => {
                self.publish(write, next, make());
                true
            }
            None => false,
        }
    }

    /// Push a value without checking for room.
    ///
    /// Always writes the current slot and advances. On a full queue this
    /// moves the write cursor onto the read cursor, so the queue reads as
    /// empty and its backlog is abandoned; further overwrites then replace the
    /// oldest slots. A replaced element is dropped by the write that replaces
    /// it, and abandoned ones still in the ring are dropped with the queue.
    /// A consumer that had already seen part of the abandoned backlog may
    /// still pop it before skipping ahead to the producer.
    /// Meant for producers that only care about the freshest samples.
    ///
    /// # Safety
    ///
    /// No consumer operation (`peek`, `try_pop`, `pop` or `drain`) may run
    /// concurrently with this call unless the queue has room. On a queue that
    /// can fill up, that means the consumer is idle or otherwise synchronized
    /// with this call. Violating this is a data race.
    #[inline]
    pub unsafe fn force_push(&mut self, value: T) {
        self.force_emplace_with(|| value)
    }

    /// Construct an element without checking for room.
    ///
    /// # Safety
    ///
    /// Same contract as [`force_push`](Self::force_push).
    #[inline]
    pub unsafe fn force_emplace_with<F>(&mut self, make: F)
    where
        F: FnOnce() -> T,
    {
        let write = self.queue.write_index.load(Ordering::Relaxed);
        let next = self.queue.next_index(write);
        self.publish(write, next, make());
    }

    /// Number of usable slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Number of queued elements (snapshot).
    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue holds no elements (snapshot).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Current write cursor and its successor, if the slot is free.
    #[inline(always)]
    fn try_reserve(&mut self) -> Option<(usize, usize)> {
        let write = self.queue.write_index.load(Ordering::Relaxed);
        let next = self.queue.next_index(write);
        if next == self.read_index_cache {
            self.read_index_cache = self.queue.read_index.load(Ordering::Acquire);
            if next == self.read_index_cache {
                return None;
            }
        }
        Some((write, next))
    }

    #[inline(always)]
    fn wait_for_space(&mut self, next: usize) {
        if next != self.read_index_cache {
            return;
        }
        self.read_index_cache = self.queue.read_index.load(Ordering::Acquire);
        while next == self.read_index_cache {
            spin_loop();
            self.read_index_cache = self.queue.read_index.load(Ordering::Acquire);
        }
    }

    #[inline(always)]
    fn publish(&mut self, write: usize, next: usize, value: T) {
        // SAFETY: only this producer writes slots, and `write` is either free
        // (checked against the consumer cursor) or handed over by the caller
        // of a force_* method.
        unsafe { self.queue.write_slot(write, value) };
        self.queue.write_index.store(next, Ordering::Release);
    }
}

impl<T, S, Q> Producer<Q>
where
    T: Clone,
    S: Storage<T>,
    Q: Deref<Target = SpscQueue<T, S>>,
{
    /// Push a clone of `value`, spinning while the queue is full.
    #[inline]
    pub fn push_cloned(&mut self, value: &T) {
        self.emplace_with(|| value.clone())
    }

    /// Push a clone of `value` if there is room. Only clones on success.
    #[inline]
    pub fn try_push_cloned(&mut self, value: &T) -> bool {
        self.try_emplace_with(|| value.clone())
    }
}

impl<Q> core::fmt::Debug for Producer<Q> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Producer")
            .field("read_index_cache", &self.read_index_cache)
            .finish_non_exhaustive()
    }
}
