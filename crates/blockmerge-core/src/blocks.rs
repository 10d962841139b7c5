// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::error::BlockMergeError;
use crate::pattern::Pattern;
use std::ops::Range;

/// Inclusive sample indices delimiting one block.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockBounds {
    pub first: usize,
    pub last: usize,
}

#[allow(clippy::len_without_is_empty)]
impl BlockBounds {
    pub const fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    /// Blocks always hold at least one sample.
    pub const fn len(&self) -> usize {
        self.last - self.first + 1
    }

    /// Half-open sample range `[first, last + 1)`.
    pub const fn sample_range(&self) -> Range<usize> {
        self.first..self.last + 1
    }
}

/// Checks `1 <= n_blocks <= series_length`.
pub fn validate_block_count(series_length: usize, n_blocks: usize) -> Result<(), BlockMergeError> {
    if n_blocks == 0 {
        return Err(BlockMergeError::invalid_configuration(
            "n_blocks must be >= 1; got 0",
        ));
    }
    if n_blocks > series_length {
        return Err(BlockMergeError::invalid_configuration(format!(
            "n_blocks={n_blocks} exceeds series length {series_length}"
        )));
    }
    Ok(())
}

/// Splits `[0, series_length)` into `n_blocks` near-equal contiguous blocks.
///
/// Sizes differ by at most one; the first `series_length % n_blocks` blocks
/// carry the extra sample.
pub fn compute_block_bounds(
    series_length: usize,
    n_blocks: usize,
) -> Result<Vec<BlockBounds>, BlockMergeError> {
    validate_block_count(series_length, n_blocks)?;

    let base = series_length / n_blocks;
    let extra = series_length % n_blocks;
    let mut bounds = Vec::with_capacity(n_blocks);
    let mut first = 0usize;
    for block in 0..n_blocks {
        let size = if block < extra { base + 1 } else { base };
        let last = first + size - 1;
        bounds.push(BlockBounds::new(first, last));
        first = last + 1;
    }
    debug_assert_eq!(first, series_length);

    Ok(bounds)
}

/// Half-open sample range covered by the blocks of `pattern`.
pub fn pattern_sample_range(
    bounds: &[BlockBounds],
    pattern: Pattern,
) -> Result<Range<usize>, BlockMergeError> {
    pattern.validate(bounds.len())?;
    let first = bounds[pattern.position].first;
    let last = bounds[pattern.last_block()].last;
    Ok(first..last + 1)
}

#[cfg(test)]
mod tests {
    use super::{BlockBounds, compute_block_bounds, pattern_sample_range};
    use crate::error::BlockMergeError;
    use crate::pattern::Pattern;

    #[test]
    fn even_split_has_equal_blocks() {
        let bounds = compute_block_bounds(12, 4).expect("valid split");
        assert_eq!(
            bounds,
            vec![
                BlockBounds::new(0, 2),
                BlockBounds::new(3, 5),
                BlockBounds::new(6, 8),
                BlockBounds::new(9, 11),
            ]
        );
    }

    #[test]
    fn remainder_goes_to_leading_blocks() {
        let bounds = compute_block_bounds(10, 3).expect("valid split");
        assert_eq!(
            bounds,
            vec![
                BlockBounds::new(0, 3),
                BlockBounds::new(4, 6),
                BlockBounds::new(7, 9),
            ]
        );
        let sizes: Vec<usize> = bounds.iter().map(BlockBounds::len).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
    }

    #[test]
    fn one_block_per_sample() {
        let bounds = compute_block_bounds(5, 5).expect("valid split");
        for (idx, block) in bounds.iter().enumerate() {
            assert_eq!(*block, BlockBounds::new(idx, idx));
        }
    }

    #[test]
    fn rejects_more_blocks_than_samples() {
        let err = compute_block_bounds(3, 5).expect_err("n_blocks > length must fail");
        assert!(matches!(err, BlockMergeError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("exceeds series length 3"));
    }

    #[test]
    fn rejects_zero_blocks() {
        let err = compute_block_bounds(3, 0).expect_err("n_blocks=0 must fail");
        assert!(matches!(err, BlockMergeError::InvalidConfiguration(_)));
    }

    #[test]
    fn pattern_sample_range_spans_merged_blocks() {
        let bounds = compute_block_bounds(10, 3).expect("valid split");
        assert_eq!(
            pattern_sample_range(&bounds, Pattern::new(1, 2)).expect("fits"),
            4..10
        );
        assert_eq!(
            pattern_sample_range(&bounds, Pattern::new(0, 1)).expect("fits"),
            0..4
        );
        assert!(pattern_sample_range(&bounds, Pattern::new(2, 2)).is_err());
    }
}
