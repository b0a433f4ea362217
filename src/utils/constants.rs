/// Input defaults
pub const DEFAULT_INPUT_FILE: &str = "measurements.txt";

/// Record delimiters
pub const FIELD_SEPARATOR: u8 = b';';
pub const RECORD_TERMINATOR: u8 = b'\n';

/// Station table sizing
pub const DEFAULT_TABLE_SLOTS: usize = 1 << 16; // 65536 slots, ~32k stations before growth
pub const MAX_LOAD_NUMERATOR: usize = 1;
pub const MAX_LOAD_DENOMINATOR: usize = 2;

/// Key arena sizing
pub const DEFAULT_ARENA_CHUNK: usize = 2 * 1024 * 1024; // 2MB, one huge page
pub const HUGE_PAGE_SIZE: usize = 2 * 1024 * 1024;

/// Decimal lookup table covers every two-byte pattern
pub const DECIMAL_LOOKUP_SIZE: usize = 1 << 16;

/// Remediation hints for allocation failures
pub const HUGE_PAGES_HINT: &str =
    "Could not allocate huge pages. Try:\nsudo sysctl -w vm.nr_hugepages=512";
pub const HEAP_HINT: &str = "Reduce --workers or --table-slots, or raise the process memory limit";

/// Environment toggles
pub const PROFILE_ENV: &str = "BRC_PROFILE";
pub const TIMINGS_SUFFIX: &str = ".timings.json";
