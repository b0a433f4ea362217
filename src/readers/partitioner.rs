use crate::utils::constants::RECORD_TERMINATOR;
use std::ops::Range;

/// Split `data` into `partitions` contiguous ranges that each end just after a
/// record terminator (the last range ends at `data.len()`).
///
/// Always returns exactly `partitions` ranges (at least one). Ranges may be
/// empty when there are fewer records than partitions.
pub fn partition(data: &[u8], partitions: usize) -> Vec<Range<usize>> {
    let partitions = partitions.max(1);
    let target_size = data.len() / partitions;

    let mut ranges = Vec::with_capacity(partitions);
    let mut prev_end = 0;

    for i in 0..partitions {
        let start = prev_end;
        let end = if i == partitions - 1 {
            data.len()
        } else {
            let mut end = start.max(target_size * (i + 1));
            while end > 0 && end < data.len() && data[end - 1] != RECORD_TERMINATOR {
                end += 1;
            }
            end
        };

        ranges.push(start..end);
        prev_end = end;
    }

    ranges
}

/// Borrow the partition slices directly.
pub fn partition_slices(data: &[u8], partitions: usize) -> Vec<&[u8]> {
    partition(data, partitions)
        .into_iter()
        .map(|range| &data[range])
        .collect()
}
