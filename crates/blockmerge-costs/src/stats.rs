// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use blockmerge_core::{
    BlockMergeError, ReproMode, TimeSeriesView, prefix_sum_squares, prefix_sum_squares_kahan,
    prefix_sums, prefix_sums_kahan,
};
use std::ops::Range;

/// Per-dimension prefix sums for O(1) range statistics.
#[derive(Clone, Debug, PartialEq)]
pub struct PrefixStats {
    prefix_sum: Vec<f64>,
    prefix_sum_sq: Vec<f64>,
    n: usize,
    d: usize,
}

fn cache_overflow_err(n: usize, d: usize) -> BlockMergeError {
    BlockMergeError::resource_limit(format!(
        "cache size overflow while planning PrefixStats for n={n}, d={d}"
    ))
}

impl PrefixStats {
    pub fn new(x: &TimeSeriesView<'_>, repro_mode: ReproMode) -> Result<Self, BlockMergeError> {
        let prefix_len_per_dim = x.n.checked_add(1).ok_or_else(|| cache_overflow_err(x.n, x.d))?;
        let total_prefix_len = prefix_len_per_dim
            .checked_mul(x.d)
            .ok_or_else(|| cache_overflow_err(x.n, x.d))?;

        let mut prefix_sum = Vec::with_capacity(total_prefix_len);
        let mut prefix_sum_sq = Vec::with_capacity(total_prefix_len);

        for dim in 0..x.d {
            let series = x.column(dim)?;
            if let Some(t) = series.iter().position(|v| !v.is_finite()) {
                return Err(BlockMergeError::invalid_input(format!(
                    "series contains a non-finite value at t={t}, dim={dim}"
                )));
            }

            let (dim_prefix_sum, dim_prefix_sum_sq) = if matches!(repro_mode, ReproMode::Strict) {
                (prefix_sums_kahan(&series), prefix_sum_squares_kahan(&series))
            } else {
                (prefix_sums(&series), prefix_sum_squares(&series))
            };

            debug_assert_eq!(dim_prefix_sum.len(), prefix_len_per_dim);
            prefix_sum.extend_from_slice(&dim_prefix_sum);
            prefix_sum_sq.extend_from_slice(&dim_prefix_sum_sq);
        }

        Ok(Self {
            prefix_sum,
            prefix_sum_sq,
            n: x.n,
            d: x.d,
        })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn d(&self) -> usize {
        self.d
    }

    /// `(sum, sum of squares)` of dimension `dim` over `range`.
    pub fn range_sums(&self, dim: usize, range: Range<usize>) -> (f64, f64) {
        assert!(
            range.start < range.end && range.end <= self.n,
            "range_sums requires a non-empty range inside [0, {}); got {range:?}",
            self.n
        );
        let base = dim * (self.n + 1);
        let sum = self.prefix_sum[base + range.end] - self.prefix_sum[base + range.start];
        let sum_sq = self.prefix_sum_sq[base + range.end] - self.prefix_sum_sq[base + range.start];
        (sum, sum_sq)
    }
}
