//! The queue: cursors plus slot storage.

use core::marker::PhantomData;

use crossbeam_utils::CachePadded;

use crate::consumer::Consumer;
use crate::error::ConfigurationError;
use crate::producer::Producer;
use crate::storage::{HeapStorage, InlineStorage, Storage};
use crate::sync::{Arc, AtomicUsize, Ordering};
use crate::trace::{debug, trace};

/// Bounded single-producer/single-consumer ring buffer.
///
/// The queue itself only answers queries. Elements go in through the
/// [`Producer`] and come out through the [`Consumer`] returned by
/// [`split`](SpscQueue::split) or [`into_split`](SpscQueue::into_split); there
/// is never more than one of each, so the single-producer/single-consumer
/// contract is checked by the compiler.
///
/// `S` selects the slot storage: [`HeapStorage`] by default, or
/// [`InlineStorage`] for a compile-time capacity.
///
/// # example
///
/// ```
/// use turbo_spsc::SpscQueue;
///
/// let mut queue = SpscQueue::<u32>::new(16).unwrap();
/// let (mut tx, mut rx) = queue.split();
///
/// std::thread::scope(|s| {
///     s.spawn(move || {
///         for i in 0..100 {
///             tx.push(i);
///         }
///     });
///     for i in 0..100 {
///         assert_eq!(rx.pop(), i);
///     }
/// });
/// ```
pub struct SpscQueue<T, S: Storage<T> = HeapStorage<T>> {
    /// Next slot the producer writes. Stored only by the producer.
    pub(crate) write_index: CachePadded<AtomicUsize>,
    /// Next slot the consumer reads. Stored only by the consumer.
    pub(crate) read_index: CachePadded<AtomicUsize>,
    storage: S,
    capacity: usize,
    _marker: PhantomData<T>,
}

/// Queue over heap-allocated slots.
pub type HeapQueue<T> = SpscQueue<T, HeapStorage<T>>;

/// Queue over `N` inline slots.
pub type InlineQueue<T, const N: usize> = SpscQueue<T, InlineStorage<T, N>>;

impl<T> SpscQueue<T, HeapStorage<T>> {
    /// Create a heap-backed queue holding up to `capacity` elements.
    ///
    /// # errors
    ///
    /// - [`ConfigurationError::ZeroCapacity`] if `capacity` is 0
    /// - [`ConfigurationError::Allocation`] if the slots cannot be allocated
    pub fn new(capacity: usize) -> Result<Self, ConfigurationError> {
        Self::from_storage(HeapStorage::with_capacity(capacity)?)
    }
}

impl<T, const N: usize> SpscQueue<T, InlineStorage<T, N>> {
    /// Create a queue whose `N` slots live inline.
    ///
    /// # errors
    ///
    /// [`ConfigurationError::ZeroCapacity`] if `N` is 0.
    pub fn new_inline() -> Result<Self, ConfigurationError> {
        Self::from_storage(InlineStorage::new())
    }

    /// Like [`new_inline`](Self::new_inline), but also checks a runtime
    /// capacity against `N`.
    ///
    /// # errors
    ///
    /// - [`ConfigurationError::ZeroCapacity`] if `capacity` or `N` is 0
    /// - [`ConfigurationError::CapacityMismatch`] if `capacity != N`
    pub fn with_capacity(capacity: usize) -> Result<Self, ConfigurationError> {
        if capacity == 0 {
            return Err(ConfigurationError::ZeroCapacity);
        }
        if capacity != N {
            return Err(ConfigurationError::CapacityMismatch {
                compile_time: N,
                runtime: capacity,
            });
        }
        Self::new_inline()
    }
}

impl<T, S: Storage<T>> SpscQueue<T, S> {
    /// Build a queue over caller-provided storage.
    ///
    /// # errors
    ///
    /// [`ConfigurationError::ZeroCapacity`] if the storage ring has fewer
    /// than two slots.
    pub fn from_storage(storage: S) -> Result<Self, ConfigurationError> {
        let ring_len = storage.ring().len();
        if ring_len < 2 {
            return Err(ConfigurationError::ZeroCapacity);
        }
        debug!(capacity = ring_len - 1, "spsc queue created");
        Ok(SpscQueue {
            write_index: CachePadded::new(AtomicUsize::new(0)),
            read_index: CachePadded::new(AtomicUsize::new(0)),
            storage,
            capacity: ring_len - 1,
            _marker: PhantomData,
        })
    }

    /// Borrow the producer and consumer halves.
    ///
    /// The queue stays borrowed, and so cannot move, until both halves are
    /// dropped. Splitting again afterwards hands out fresh halves over the
    /// same contents.
    pub fn split(&mut self) -> (Producer<&Self>, Consumer<&Self>) {
        let this: &Self = self;
        (Producer::new(this), Consumer::new(this))
    }

    /// Move the queue behind an `Arc` and return owning halves, for threads
    /// that need `'static` handles.
    pub fn into_split(self) -> (Producer<Arc<Self>>, Consumer<Arc<Self>>) {
        let shared = Arc::new(self);
        (Producer::new(shared.clone()), Consumer::new(shared))
    }

    /// Number of usable slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of queued elements.
    ///
    /// A snapshot: under concurrent use the value may be stale by the time it
    /// is read. Never exceeds [`capacity`](Self::capacity).
    #[inline]
    pub fn len(&self) -> usize {
        let write = self.write_index.load(Ordering::Acquire);
        let read = self.read_index.load(Ordering::Acquire);
        if write >= read {
            write - read
        } else {
            self.capacity - read + 1 + write
        }
    }

    /// Whether the queue holds no elements (snapshot).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.write_index.load(Ordering::Acquire) == self.read_index.load(Ordering::Acquire)
    }

    /// Cursor position after `index`, wrapping at `capacity + 1`.
    #[inline(always)]
    pub(crate) fn next_index(&self, index: usize) -> usize {
        if index == self.capacity {
            0
        } else {
            index + 1
        }
    }

    #[inline(always)]
    fn slot(&self, index: usize) -> *mut Option<T> {
        let ring = self.storage.ring();
        debug_assert!(index < ring.len());
        // SAFETY: cursors never leave `0..=capacity` and the ring holds
        // `capacity + 1` slots.
        unsafe { ring.get_unchecked(index).get() }
    }

    /// Store `value` in slot `index`, dropping anything left there by a lap.
    ///
    /// # Safety
    ///
    /// Producer only, and slot `index` must not be accessed concurrently.
    #[inline(always)]
    pub(crate) unsafe fn write_slot(&self, index: usize, value: T) {
        *self.slot(index) = Some(value);
    }

    /// Move the element out of slot `index`, leaving it empty. `None` means
    /// the slot was already consumed.
    ///
    /// # Safety
    ///
    /// Consumer only, and slot `index` must not be written concurrently.
    #[inline(always)]
    pub(crate) unsafe fn take_slot(&self, index: usize) -> Option<T> {
        (*self.slot(index)).take()
    }

    /// # Safety
    ///
    /// Consumer only, and slot `index` must not be written while the
    /// reference is alive.
    #[inline(always)]
    pub(crate) unsafe fn slot_ref(&self, index: usize) -> Option<&T> {
        (*self.slot(index)).as_ref()
    }

    /// Move the read cursor onto the write cursor, discarding the consumer's
    /// view of the ring. Returns the new position. Consumer only.
    pub(crate) fn resync_read(&self) -> usize {
        let write = self.write_index.load(Ordering::Acquire);
        debug!(write, "read cursor overtaken by overwrites, resyncing");
        self.read_index.store(write, Ordering::Release);
        write
    }
}

// SAFETY: each slot is written by the producer before the release store of
// `write_index` and read by the consumer after the matching acquire load (and
// the reverse for `read_index`), so no slot is accessed from both threads at
// once. `Producer`/`Consumer` cannot be cloned, so there is at most one of each.
unsafe impl<T: Send, S: Storage<T> + Send> Sync for SpscQueue<T, S> {}

impl<T, S: Storage<T>> core::fmt::Debug for SpscQueue<T, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpscQueue")
            .field("capacity", &self.capacity)
            .field("write_index", &self.write_index.load(Ordering::Relaxed))
            .field("read_index", &self.read_index.load(Ordering::Relaxed))
            .finish()
    }
}

impl<T, S: Storage<T>> Drop for SpscQueue<T, S> {
    fn drop(&mut self) {
        if !core::mem::needs_drop::<T>() {
            return;
        }
        trace!(pending = self.len(), "draining queue on drop");
        // Pending elements sit between the cursors; overwrites can leave
        // abandoned ones anywhere else, so every slot is emptied.
        for index in 0..=self.capacity {
            // SAFETY: `&mut self` is exclusive.
            drop(unsafe { self.take_slot(index) });
        }
    }
}
