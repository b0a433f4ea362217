pub mod constants;
pub mod progress;
pub mod timings;

pub use constants::*;
pub use progress::ProgressReporter;
pub use timings::StageTimings;
