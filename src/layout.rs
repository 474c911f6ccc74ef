//! Slot-count arithmetic for the padded ring.
//!
//! The live ring is surrounded by unused slots on both sides so that its first
//! and last slots never share a cache line with the cursors or with whatever
//! the allocator placed next to the buffer.

/// Cache line size assumed for padding.
pub const CACHE_LINE_SIZE: usize = 64;

/// Number of guard slots needed to cover one cache line.
///
/// Zero-sized elements are counted as one byte; the result is never zero.
pub const fn padding_slots(element_size: usize, cache_line_size: usize) -> usize {
    let size = if element_size == 0 { 1 } else { element_size };
    let slots = cache_line_size.div_ceil(size);
    if slots == 0 {
        1
    } else {
        slots
    }
}

/// Largest user capacity whose padded ring still fits in `usize`.
pub const fn max_capacity(padding: usize) -> usize {
    usize::MAX
        .saturating_sub(1)
        .saturating_sub(padding.saturating_mul(2))
}

/// `capacity` reduced to [`max_capacity`] if the padded length would overflow.
pub const fn clamp_capacity(capacity: usize, padding: usize) -> usize {
    let max = max_capacity(padding);
    if capacity > max {
        max
    } else {
        capacity
    }
}

/// Total slots to allocate: the ring (`capacity + 1`) plus padding on each end.
pub const fn storage_len(capacity: usize, padding: usize) -> usize {
    capacity
        .saturating_add(1)
        .saturating_add(padding.saturating_mul(2))
}
