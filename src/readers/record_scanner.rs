use crate::models::decimal::{Decimal1, DecimalLookupTable};
use crate::utils::constants::{FIELD_SEPARATOR, RECORD_TERMINATOR};

/// Single-pass iterator over `<name>;<measurement>\n` records in a byte range.
///
/// Names borrow from the input; nothing is allocated per record. A final
/// record without a terminator is still yielded, and a trailing fragment with
/// no separator is ignored.
pub struct RecordScanner<'a> {
    data: &'a [u8],
    lookup: &'a DecimalLookupTable,
    pos: usize,
}

impl<'a> RecordScanner<'a> {
    pub fn new(data: &'a [u8], lookup: &'a DecimalLookupTable) -> Self {
        Self {
            data,
            lookup,
            pos: 0,
        }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        let data: &'a [u8] = self.data;
        &data[self.pos..]
    }
}

impl<'a> Iterator for RecordScanner<'a> {
    type Item = (&'a [u8], Decimal1);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.remaining();
        if rest.is_empty() {
            return None;
        }

        let separator = match rest.iter().position(|&b| b == FIELD_SEPARATOR) {
            Some(idx) => idx,
            None => {
                self.pos = self.data.len();
                return None;
            }
        };

        let name = &rest[..separator];
        let after = &rest[separator + 1..];

        // Measurements are at most six bytes, so the terminator is close
        let (field, consumed) = match after.iter().position(|&b| b == RECORD_TERMINATOR) {
            Some(idx) => (&after[..idx], separator + 1 + idx + 1),
            None => (after, rest.len()),
        };

        self.pos += consumed;
        Some((name, self.lookup.parse(field)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scan(data: &[u8]) -> Vec<(String, Decimal1)> {
        let lookup = DecimalLookupTable::build();
        RecordScanner::new(data, &lookup)
            .map(|(name, value)| (String::from_utf8_lossy(name).into_owned(), value))
            .collect()
    }

    #[test]
    fn test_scan_records() {
        let records = scan(b"A;10.0\nB;-3.5\nA;20.5\n");
        assert_eq!(
            records,
            vec![
                ("A".to_string(), 100),
                ("B".to_string(), -35),
                ("A".to_string(), 205),
            ]
        );
    }

    #[test]
    fn test_final_record_without_newline() {
        let records = scan(b"Hamburg;12.0\nBulawayo;-8.9");
        assert_eq!(
            records,
            vec![("Hamburg".to_string(), 120), ("Bulawayo".to_string(), -89)]
        );
    }

    #[test]
    fn test_utf8_and_punctuation_in_names() {
        let records = scan("St. John's;15.2\nZürich;-0.3\n".as_bytes());
        assert_eq!(
            records,
            vec![("St. John's".to_string(), 152), ("Zürich".to_string(), -3)]
        );
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(scan(b"").is_empty());
    }

    #[test]
    fn test_iterator_is_exhausted_after_consumption() {
        let lookup = DecimalLookupTable::build();
        let mut scanner = RecordScanner::new(b"A;1.0\n", &lookup);

        assert_eq!(scanner.next(), Some((&b"A"[..], 10)));
        assert_eq!(scanner.next(), None);
        assert_eq!(scanner.next(), None);
        assert!(scanner.remaining().is_empty());
    }

    #[test]
    fn test_names_alias_input() {
        let lookup = DecimalLookupTable::build();
        let data = b"Oslo;1.5\n";
        let (name, _) = RecordScanner::new(data, &lookup).next().unwrap();
        assert_eq!(name.as_ptr(), data.as_ptr());
    }
}
