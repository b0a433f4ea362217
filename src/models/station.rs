use serde::{Deserialize, Serialize};

use crate::models::decimal::{wide_to_display_float, Decimal1, WideDecimal1};

/// Running statistics for one station, all values in tenths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationStats {
    pub min: Decimal1,
    pub max: Decimal1,
    pub sum: WideDecimal1,
    pub count: u64,
}

impl StationStats {
    #[inline]
    pub fn new(value: Decimal1) -> Self {
        Self {
            min: value,
            max: value,
            sum: value as WideDecimal1,
            count: 1,
        }
    }

    #[inline]
    pub fn add(&mut self, value: Decimal1) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value as WideDecimal1;
        self.count += 1;
    }

    #[inline]
    pub fn combine(&mut self, other: &StationStats) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.sum += other.sum;
        self.count += other.count;
    }

    /// Mean in tenths, rounded half away from zero.
    pub fn mean_tenths(&self) -> WideDecimal1 {
        let sum = self.sum as i128;
        let count = self.count.max(1) as i128;
        let rounded = (sum.abs() * 2 + count) / (count * 2);
        if sum < 0 {
            -rounded as WideDecimal1
        } else {
            rounded as WideDecimal1
        }
    }

    pub fn mean(&self) -> f64 {
        wide_to_display_float(self.sum) / self.count.max(1) as f64
    }
}
