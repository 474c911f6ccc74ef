//! Consumer half of an SPSC queue.

use core::cell::Cell;
use core::ops::Deref;

use crate::queue::SpscQueue;
use crate::storage::Storage;
use crate::sync::{spin_loop, Ordering};

/// Read end of a [`SpscQueue`].
///
/// There is exactly one consumer per queue. It keeps a private copy of the
/// producer's cursor and only reloads the shared one when that copy says the
/// queue is empty.
pub struct Consumer<Q> {
    queue: Q,
    /// last observed `write_index`; consumer-owned. `Cell` so `peek` can
    /// refresh it through `&self`.
    write_index_cache: Cell<usize>,
}

impl<T, S, Q> Consumer<Q>
where
    S: Storage<T>,
    Q: Deref<Target = SpscQueue<T, S>>,
{
    pub(crate) fn new(queue: Q) -> Self {
        let write_index_cache = Cell::new(queue.write_index.load(Ordering::Acquire));
        Consumer {
            queue,
            write_index_cache,
        }
    }

    /// Borrow the oldest element without removing it.
    ///
    /// The borrow keeps the consumer from popping until it ends, which makes
    /// read-then-advance protocols safe.
    ///
    /// # example
    ///
    /// ```
    /// use turbo_spsc::SpscQueue;
    ///
    /// let mut queue = SpscQueue::<String>::new(4).unwrap();
    /// let (mut tx, mut rx) = queue.split();
    /// assert!(rx.peek().is_none());
    /// tx.push("hello".to_string());
    /// assert_eq!(rx.peek().map(String::as_str), Some("hello"));
    /// assert_eq!(rx.try_pop().as_deref(), Some("hello"));
    /// ```
    #[inline]
    pub fn peek<'a>(&'a self) -> Option<&'a T>
    where
        S: 'a,
    {
        let read = self.ready_index()?;
        // SAFETY: `read` is published and only this consumer reads slots.
        match unsafe { self.queue.slot_ref(read) } {
            Some(value) => Some(value),
            None => {
                self.resync();
                None
            }
        }
    }

    /// Remove the oldest element, or `None` if the queue is empty.
    #[inline]
    pub fn try_pop(&mut self) -> Option<T> {
        let read = self.ready_index()?;
        self.take(read)
    }

    /// Remove the oldest element, spinning while the queue is empty.
    ///
    /// Busy-waits without yielding. Never call it after the producer has
    /// stopped for good; poll [`try_pop`](Self::try_pop) instead.
    #[inline]
    pub fn pop(&mut self) -> T {
        loop {
            if let Some(value) = self.try_pop() {
                return value;
            }
            spin_loop();
        }
    }

    /// Iterator popping elements until the queue looks empty.
    ///
    /// Elements the producer publishes while draining are picked up too.
    pub fn drain(&mut self) -> Drain<'_, Q> {
        Drain { consumer: self }
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

    /// Read cursor if it points at a published element.
    #[inline(always)]
    fn ready_index(&self) -> Option<usize> {
        let read = self.queue.read_index.load(Ordering::Relaxed);
        if read == self.write_index_cache.get() {
            self.refresh();
            if read == self.write_index_cache.get() {
                return None;
            }
        }
        Some(read)
    }

    #[inline(always)]
    fn refresh(&self) {
        self.write_index_cache
            .set(self.queue.write_index.load(Ordering::Acquire));
    }

    /// Move the element at `read` out and hand the slot back.
    ///
    /// A published slot is only ever empty when overwrites lapped the
    /// consumer after its cached write cursor was loaded; the consumer then
    /// skips to the producer's position.
    #[inline(always)]
    fn take(&mut self, read: usize) -> Option<T> {
        // SAFETY: `read` is published, and the release store below is what
        // hands the slot back to the producer.
        match unsafe { self.queue.take_slot(read) } {
            Some(value) => {
                let next = self.queue.next_index(read);
                self.queue.read_index.store(next, Ordering::Release);
                Some(value)
            }
            None => {
                self.resync();
                None
            }
        }
    }

    #[cold]
    fn resync(&self) {
        self.write_index_cache.set(self.queue.resync_read());
    }
}

impl<Q> core::fmt::Debug for Consumer<Q> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Consumer")
            .field("write_index_cache", &self.write_index_cache.get())
            .finish_non_exhaustive()
    }
}

/// Iterator returned by [`Consumer::drain`].
pub struct Drain<'a, Q> {
    consumer: &'a mut Consumer<Q>,
}

impl<T, S, Q> Iterator for Drain<'_, Q>
where
    S: Storage<T>,
    Q: Deref<Target = SpscQueue<T, S>>,
{
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.consumer.try_pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.consumer.len(), None)
    }
}
