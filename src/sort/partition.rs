//! Chunk partitioning
//!
//! Splits `0..len` into contiguous, near-equal ranges, one per worker.

use std::ops::Range;

/// Compute chunk boundaries for `len` items over `workers` workers
///
/// Chunk sizes differ by at most one and the first `len % workers` chunks get
/// the extra item, so two workers over 5 items get `0..3` and `3..5`. Empty
/// chunks are never returned: fewer items than workers yields one chunk per
/// item, and `len == 0` (or `workers == 0`) yields no chunks at all.
pub fn chunk_bounds(len: usize, workers: usize) -> Vec<Range<usize>> {
    if len == 0 || workers == 0 {
        return Vec::new();
    }

    let workers = workers.min(len);
    let base = len / workers;
    let extra = len % workers;

    let mut bounds = Vec::with_capacity(workers);
    let mut start = 0;
    for i in 0..workers {
        let size = base + usize::from(i < extra);
        bounds.push(start..start + size);
        start += size;
    }

    debug_assert_eq!(start, len);
    bounds
}

/// Split a slice into disjoint mutable chunks following `bounds`
///
/// `bounds` must be contiguous ranges covering the slice from index 0, as
/// produced by [`chunk_bounds`].
pub fn split_chunks<'s, T>(mut items: &'s mut [T], bounds: &[Range<usize>]) -> Vec<&'s mut [T]> {
    let mut chunks = Vec::with_capacity(bounds.len());
    for range in bounds {
        let (head, tail) = std::mem::take(&mut items).split_at_mut(range.len());
        chunks.push(head);
        items = tail;
    }
    chunks
}
