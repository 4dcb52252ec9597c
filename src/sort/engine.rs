//! Parallel Sort Engine
//!
//! Sorts a slice of record references with a fixed number of scoped worker
//! threads:
//!
//! ```text
//! [r7 r2 r9 r4 r1]          split_at_mut
//!   ├── worker 0: [r7 r2 r9] → sort → [r2 r7 r9]
//!   └── worker 1: [r4 r1]    → sort → [r1 r4]
//!        ↓ join all (barrier)
//! k-way merge on caller      → [r1 r2 r4 r7 r9]
//! ```
//!
//! Workers own disjoint `&mut` windows of the slice, so the data needs no
//! locking. The only shared resource is the optional [`OutputSink`].

use crate::output::OutputSink;
use crate::sort::error::{SortError, SortResult};
use crate::sort::merge::merge_chunks;
use crate::sort::partition::{chunk_bounds, split_chunks};
use serde::Deserialize;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Configuration for the sort engine
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SortConfig {
    /// Number of worker threads per sort call (default: 2)
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_workers() -> usize {
    2
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

impl SortConfig {
    pub fn new(workers: usize) -> Self {
        Self { workers }
    }
}

/// Timing and sizing of one sort call
#[derive(Debug, Clone, Default)]
pub struct SortStats {
    /// Number of items sorted
    pub items: usize,
    /// Worker threads actually launched
    pub workers: usize,
    /// Size of each worker's chunk, in worker order
    pub chunk_sizes: Vec<usize>,
    /// Time each worker spent sorting its chunk, in worker order
    pub worker_times: Vec<Duration>,
    /// Time spent in the k-way merge
    pub merge_time: Duration,
    /// Wall-clock time for the whole call
    pub total_time: Duration,
}

impl fmt::Display for SortStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} items, {} workers, merge {:?}, total {:?}",
            self.items, self.workers, self.merge_time, self.total_time
        )
    }
}

/// Sorts slices with scoped worker threads and a k-way merge
#[derive(Debug, Clone)]
pub struct ParallelSorter {
    config: SortConfig,
    sink: Option<Arc<OutputSink>>,
}

impl ParallelSorter {
    /// Create a sorter with `workers` threads and no console output
    pub fn new(workers: usize) -> Self {
        Self::with_config(SortConfig::new(workers))
    }

    pub fn with_config(config: SortConfig) -> Self {
        Self { config, sink: None }
    }

    /// Send worker progress lines to `sink`
    pub fn with_sink(mut self, sink: Arc<OutputSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Sort `items` in place
    ///
    /// On `Err` the slice holds some permutation of its input and must not be
    /// treated as sorted.
    pub fn sort<T: Ord + Copy + Send>(&self, items: &mut [T]) -> SortResult<SortStats> {
        if self.config.workers == 0 {
            return Err(SortError::NoWorkers);
        }

        let start = Instant::now();
        let bounds = chunk_bounds(items.len(), self.config.workers);

        if bounds.is_empty() {
            tracing::debug!("Nothing to sort, no workers launched");
            return Ok(SortStats::default());
        }

        let sink = self.sink.as_deref();
        let chunks = split_chunks(items, &bounds);

        let outcomes: Vec<std::thread::Result<Duration>> = std::thread::scope(|s| {
            let handles: Vec<_> = chunks
                .into_iter()
                .enumerate()
                .map(|(worker, chunk)| s.spawn(move || sort_chunk(worker, chunk, sink)))
                .collect();

            // Join every handle, even after a failure: an unjoined panicked
            // thread would make the scope itself panic.
            handles.into_iter().map(|handle| handle.join()).collect()
        });

        let mut worker_times = Vec::with_capacity(outcomes.len());
        for (worker, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(elapsed) => worker_times.push(elapsed),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!("Sort worker {} panicked: {}", worker, message);
                    return Err(SortError::WorkerPanicked { worker, message });
                }
            }
        }

        let merge_start = Instant::now();
        merge_chunks(items, &bounds);
        let merge_time = merge_start.elapsed();

        if let Some(sink) = sink {
            sink.line(format!(
                "Merged {} chunks ({} records) in {:?}",
                bounds.len(),
                items.len(),
                merge_time
            ));
        }

        let stats = SortStats {
            items: items.len(),
            workers: bounds.len(),
            chunk_sizes: bounds.iter().map(|range| range.len()).collect(),
            worker_times,
            merge_time,
            total_time: start.elapsed(),
        };

        tracing::info!("Parallel sort complete: {}", stats);
        Ok(stats)
    }
}

impl Default for ParallelSorter {
    fn default() -> Self {
        Self::with_config(SortConfig::default())
    }
}

/// Body of one worker thread
fn sort_chunk<T: Ord>(worker: usize, chunk: &mut [T], sink: Option<&OutputSink>) -> Duration {
    let start = Instant::now();

    if let Some(sink) = sink {
        sink.line(format!("Worker {} sorting {} records", worker, chunk.len()));
    }

    chunk.sort_unstable();
    let elapsed = start.elapsed();

    tracing::debug!(worker, records = chunk.len(), ?elapsed, "chunk sorted");
    if let Some(sink) = sink {
        sink.line(format!(
            "Worker {} sorted {} records in {:?}",
            worker,
            chunk.len(),
            elapsed
        ));
    }

    elapsed
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
