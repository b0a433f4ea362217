pub mod decimal;
pub mod station;

pub use decimal::{Decimal1, DecimalLookupTable, WideDecimal1};
pub use station::StationStats;
