pub mod arena;
pub mod parallel_processor;
pub mod station_table;

pub use arena::{AllocationMode, KeyArena, KeyRef};
pub use parallel_processor::{ParallelProcessor, PhaseTimings};
pub use station_table::StationTable;
