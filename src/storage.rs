//! Slot storage backing a queue.
//!
//! The engine only needs one thing from its storage: a fixed, contiguous run
//! of `capacity + 1` slots, each empty or holding one element. [`HeapStorage`] sizes that
//! run at construction time; [`InlineStorage`] fixes it at compile time and
//! lives inside the queue itself.

use core::cell::UnsafeCell;
use core::mem::{self, offset_of};
use core::slice;

use crate::error::ConfigurationError;
use crate::layout::{self, CACHE_LINE_SIZE};
use crate::trace::{debug, warn};

/// One element location. Starts empty.
///
/// Overwriting a slot drops whatever it still holds, so an element the
/// consumer never took is released by the next write to its slot.
#[repr(transparent)]
pub struct Slot<T>(UnsafeCell<Option<T>>);

impl<T> Slot<T> {
    /// An empty slot.
    pub const fn empty() -> Self {
        Slot(UnsafeCell::new(None))
    }

    #[inline(always)]
    pub(crate) fn get(&self) -> *mut Option<T> {
        self.0.get()
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Fixed-capacity slot storage with indexed access.
///
/// # Safety
///
/// Implementors must guarantee that:
/// - `ring` returns a slice of the same address and length on every call for
///   as long as the storage is not moved or dropped,
/// - `ring` may be called from two threads at once,
/// - the storage never reads or writes the contents of the slots; the queue
///   alone decides which slots hold live values. The queue empties every
///   slot before the storage is dropped.
pub unsafe trait Storage<T> {
    /// The live ring. Its length is the queue capacity plus one.
    fn ring(&self) -> &[Slot<T>];
}

/// Heap-allocated slots with cache-line padding on both ends.
pub struct HeapStorage<T> {
    slots: Box<[Slot<T>]>,
    padding: usize,
    ring_len: usize,
}

impl<T> HeapStorage<T> {
    /// Allocate storage for `capacity` elements.
    ///
    /// A capacity too large for the padded length to fit in `usize` is
    /// clamped before allocating; the queue's `capacity()` reports the
    /// clamped value.
    pub fn with_capacity(capacity: usize) -> Result<Self, ConfigurationError> {
        if capacity == 0 {
            return Err(ConfigurationError::ZeroCapacity);
        }

        let padding = layout::padding_slots(mem::size_of::<Slot<T>>(), CACHE_LINE_SIZE);
        let effective = layout::clamp_capacity(capacity, padding);
        if effective < capacity {
            warn!(
                requested = capacity,
                clamped = effective,
                "padded ring exceeds usize, clamping capacity"
            );
        }

        let len = layout::storage_len(effective, padding);
        let mut slots: Vec<Slot<T>> = Vec::new();
        slots
            .try_reserve_exact(len)
            .map_err(|_| ConfigurationError::Allocation { slots: len })?;
        slots.resize_with(len, Slot::empty);

        debug!(
            capacity = effective,
            padding,
            slots = len,
            "allocated heap ring"
        );

        Ok(HeapStorage {
            slots: slots.into_boxed_slice(),
            padding,
            ring_len: effective + 1,
        })
    }

    /// Guard slots on each side of the ring.
    pub fn padding(&self) -> usize {
        self.padding
    }

    /// Total allocated slots, guards included.
    pub fn allocated_slots(&self) -> usize {
        self.slots.len()
    }
}

// SAFETY: the boxed slice never moves while the box is alive, and the
// storage never touches slot contents.
unsafe impl<T> Storage<T> for HeapStorage<T> {
    #[inline(always)]
    fn ring(&self) -> &[Slot<T>] {
        &self.slots[self.padding..self.padding + self.ring_len]
    }
}

/// Compile-time sized slots stored inline, guarded by a cache line of unused
/// bytes on each side.
///
/// Holds `N + 1` slots: `N` usable plus the spare that tells full from empty.
#[repr(C)]
pub struct InlineStorage<T, const N: usize> {
    _head_guard: [u8; CACHE_LINE_SIZE],
    slots: [Slot<T>; N],
    spare: Slot<T>,
    _tail_guard: [u8; CACHE_LINE_SIZE],
}

impl<T, const N: usize> InlineStorage<T, N> {
    /// Empty inline storage.
    pub const fn new() -> Self {
        InlineStorage {
            _head_guard: [0; CACHE_LINE_SIZE],
            slots: [const { Slot::empty() }; N],
            spare: Slot::empty(),
            _tail_guard: [0; CACHE_LINE_SIZE],
        }
    }
}

impl<T, const N: usize> Default for InlineStorage<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: `#[repr(C)]` places `spare` directly after `slots` (an array's size
// is a multiple of its element alignment), so `slots` and `spare` form one
// contiguous run of `N + 1` slots. The pointer is derived from `self` so it
// covers both fields.
unsafe impl<T, const N: usize> Storage<T> for InlineStorage<T, N> {
    #[inline(always)]
    fn ring(&self) -> &[Slot<T>] {
        let base = (self as *const Self).cast::<u8>();
        debug_assert_eq!(
            offset_of!(Self, spare),
            offset_of!(Self, slots) + N * mem::size_of::<Slot<T>>()
        );
        unsafe {
            let first = base.add(offset_of!(Self, slots)).cast::<Slot<T>>();
            slice::from_raw_parts(first, N + 1)
        }
    }
}
