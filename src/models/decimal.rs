use crate::utils::constants::DECIMAL_LOOKUP_SIZE;

/// A measurement in tenths, e.g. `-12.3` is stored as `-123`.
pub type Decimal1 = i16;

/// Accumulator width for sums of [`Decimal1`] values, still in tenths.
pub type WideDecimal1 = i64;

/// Lookup table resolving the last two significant digits of a measurement
/// field in one indexed load.
///
/// The index is built from the units digit byte (the byte before `.`) in the
/// high half and the fractional digit byte in the low half. Every other
/// pattern maps to zero, which keeps malformed input memory-safe.
pub struct DecimalLookupTable {
    entries: Box<[Decimal1]>,
}

impl DecimalLookupTable {
    pub fn build() -> Self {
        let mut entries = vec![0 as Decimal1; DECIMAL_LOOKUP_SIZE].into_boxed_slice();

        for units in b'0'..=b'9' {
            for tenths in b'0'..=b'9' {
                let value = (units - b'0') as Decimal1 * 10 + (tenths - b'0') as Decimal1;
                entries[Self::index(units, tenths)] = value;
            }
        }

        Self { entries }
    }

    #[inline(always)]
    fn index(units: u8, tenths: u8) -> usize {
        ((units as usize) << 8) | tenths as usize
    }

    /// Parse a field of the form `-?digits.digit` into tenths.
    ///
    /// Fields outside that grammar produce an unspecified value.
    #[inline]
    pub fn parse(&self, field: &[u8]) -> Decimal1 {
        let (negative, digits) = match field.split_first() {
            Some((b'-', rest)) => (true, rest),
            _ => (false, field),
        };

        let len = digits.len();
        if len < 3 {
            return 0;
        }

        let tail = self.entries[Self::index(digits[len - 3], digits[len - 1])];

        let mut leading: Decimal1 = 0;
        for &byte in &digits[..len - 3] {
            leading = leading
                .wrapping_mul(10)
                .wrapping_add(byte.wrapping_sub(b'0') as Decimal1);
        }

        let magnitude = leading.wrapping_mul(100).wrapping_add(tail);
        if negative {
            magnitude.wrapping_neg()
        } else {
            magnitude
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DecimalLookupTable {
    fn default() -> Self {
        Self::build()
    }
}

pub fn to_display_float(value: Decimal1) -> f64 {
    value as f64 / 10.0
}

pub fn wide_to_display_float(value: WideDecimal1) -> f64 {
    value as f64 / 10.0
}

/// Render a tenths value with exactly one fractional digit.
pub fn format_tenths(value: WideDecimal1) -> String {
    let magnitude = value.unsigned_abs();
    let sign = if value < 0 { "-" } else { "" };
    format!("{}{}.{}", sign, magnitude / 10, magnitude % 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_common_shapes() {
        let table = DecimalLookupTable::build();

        assert_eq!(table.parse(b"0.0"), 0);
        assert_eq!(table.parse(b"1.2"), 12);
        assert_eq!(table.parse(b"12.3"), 123);
        assert_eq!(table.parse(b"-4.5"), -45);
        assert_eq!(table.parse(b"-99.9"), -999);
        assert_eq!(table.parse(b"999.9"), 9999);
        assert_eq!(table.parse(b"-999.9"), -9999);
    }

    #[test]
    fn test_parse_matches_formatting_for_whole_range() {
        let table = DecimalLookupTable::build();

        for tenths in -9999..=9999i64 {
            let text = format_tenths(tenths);
            assert_eq!(
                table.parse(text.as_bytes()) as i64,
                tenths,
                "round trip failed for {}",
                text
            );
        }
    }

    #[test]
    fn test_parse_malformed_is_safe() {
        let table = DecimalLookupTable::build();

        // Values are unspecified, the calls just must not panic
        let _ = table.parse(b"");
        let _ = table.parse(b"-");
        let _ = table.parse(b"1.");
        let _ = table.parse(b"abc.d");
        let _ = table.parse(b"99999999999.9");
    }

    #[test]
    fn test_table_only_populates_digit_pairs() {
        let table = DecimalLookupTable::build();
        assert_eq!(table.len(), DECIMAL_LOOKUP_SIZE);

        let populated = table.entries.iter().filter(|&&v| v != 0).count();
        // 100 digit pairs, minus the "00" pair which maps to zero
        assert_eq!(populated, 99);
    }

    #[test]
    fn test_display_conversions() {
        assert_eq!(to_display_float(-35), -3.5);
        assert_eq!(to_display_float(205), 20.5);
        assert_eq!(wide_to_display_float(305), 30.5);
    }

    #[test]
    fn test_format_tenths() {
        assert_eq!(format_tenths(0), "0.0");
        assert_eq!(format_tenths(5), "0.5");
        assert_eq!(format_tenths(-5), "-0.5");
        assert_eq!(format_tenths(153), "15.3");
        assert_eq!(format_tenths(-9999), "-999.9");
        assert_eq!(format_tenths(i64::MIN), "-922337203685477580.8");
    }
}
