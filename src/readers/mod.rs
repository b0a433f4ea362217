pub mod mapped_input;
pub mod partitioner;
pub mod record_scanner;

pub use mapped_input::MappedInput;
pub use partitioner::{partition, partition_slices};
pub use record_scanner::RecordScanner;
