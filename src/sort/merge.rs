//! K-way merge of sorted runs
//!
//! Runs on the coordinating thread once every worker has finished. A binary
//! min-heap holds the current head of each run; ties are broken by run number
//! so equal items keep their run order (left chunk first).

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::ops::Range;

/// Heap entry: the head item of one run
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct MergeEntry<T> {
    item: T,
    run: usize,
    pos: usize,
}

/// Merge individually sorted runs into one sorted vector
pub fn merge_runs<T: Ord + Copy>(runs: &[&[T]]) -> Vec<T> {
    let total: usize = runs.iter().map(|run| run.len()).sum();
    let mut merged = Vec::with_capacity(total);

    let mut heap: BinaryHeap<Reverse<MergeEntry<T>>> = BinaryHeap::with_capacity(runs.len());
    for (run, items) in runs.iter().enumerate() {
        if let Some(&item) = items.first() {
            heap.push(Reverse(MergeEntry { item, run, pos: 0 }));
        }
    }

    while let Some(Reverse(entry)) = heap.pop() {
        merged.push(entry.item);

        let next = entry.pos + 1;
        if let Some(&item) = runs[entry.run].get(next) {
            heap.push(Reverse(MergeEntry {
                item,
                run: entry.run,
                pos: next,
            }));
        }
    }

    merged
}

/// Merge the sorted chunks of `items` described by `bounds`, in place
///
/// Only the items themselves move (for the catalog these are references), the
/// merged order is written back into the same slice.
pub fn merge_chunks<T: Ord + Copy>(items: &mut [T], bounds: &[Range<usize>]) {
    if bounds.len() <= 1 {
        return;
    }

    let merged = {
        let runs: Vec<&[T]> = bounds.iter().map(|range| &items[range.clone()]).collect();
        merge_runs(&runs)
    };

    items.copy_from_slice(&merged);
}
