use crate::error::{ProcessingError, Result};
use crate::models::DecimalLookupTable;
use crate::processors::{AllocationMode, StationTable};
use crate::readers::partitioner::partition;
use crate::utils::constants::DEFAULT_TABLE_SLOTS;
use crate::utils::progress::ProgressReporter;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct ParallelProcessor {
    max_workers: usize,
    table_slots: usize,
    allocation: AllocationMode,
}

/// Wall-clock time spent in each pipeline phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseTimings {
    pub aggregate: Duration,
    pub merge: Duration,
}

impl ParallelProcessor {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            table_slots: DEFAULT_TABLE_SLOTS,
            allocation: AllocationMode::Heap,
        }
    }

    pub fn with_table_slots(mut self, table_slots: usize) -> Self {
        self.table_slots = table_slots;
        self
    }

    pub fn with_allocation(mut self, allocation: AllocationMode) -> Self {
        self.allocation = allocation;
        self
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Aggregate every record in `data` into one merged table.
    pub fn process(&self, data: &[u8]) -> Result<StationTable> {
        self.process_with_progress(data, None)
            .map(|(table, _timings)| table)
    }

    /// Partition `data` into one range per worker, aggregate each range on its
    /// own thread, then merge the partition tables sequentially.
    ///
    /// Any partition failure aborts the run; no partial result is returned.
    pub fn process_with_progress(
        &self,
        data: &[u8],
        progress: Option<&ProgressReporter>,
    ) -> Result<(StationTable, PhaseTimings)> {
        let lookup = DecimalLookupTable::build();
        let ranges = partition(data, self.max_workers);
        let total_partitions = ranges.len();
        let completed = AtomicUsize::new(0);

        debug!(
            "Split {} bytes into {} partitions",
            data.len(),
            total_partitions
        );
        if let Some(p) = progress {
            p.set_message(&format!("Aggregating {} partitions...", total_partitions));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        let started = Instant::now();
        let partials: Result<Vec<StationTable>> = pool.install(|| {
            ranges
                .into_par_iter()
                .map(|range| {
                    let table = StationTable::aggregate_partition(
                        &data[range],
                        &lookup,
                        self.table_slots,
                        self.allocation,
                    );

                    let count = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(p) = progress {
                        p.update(count as u64);
                    }

                    table
                })
                .collect()
        });
        let partials = partials?;
        let aggregate = started.elapsed();

        if let Some(p) = progress {
            p.set_message("Merging partitions...");
        }

        let started = Instant::now();
        let mut merged = StationTable::with_capacity(self.table_slots, self.allocation)?;
        for partial in partials {
            merged.merge_from(partial)?;
        }
        let merge = started.elapsed();

        info!(
            "Aggregated {} records across {} stations using {} workers",
            merged.total_records(),
            merged.len(),
            self.max_workers
        );
        if let Some(p) = progress {
            p.finish_with_message(&format!("Aggregated {} stations", merged.len()));
        }

        Ok((merged, PhaseTimings { aggregate, merge }))
    }
}

impl Default for ParallelProcessor {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}
