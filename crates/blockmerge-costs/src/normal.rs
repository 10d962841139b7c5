// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::model::CostFunction;
use crate::stats::PrefixStats;
use blockmerge_core::{
    BlockBounds, BlockMergeError, Pattern, ReproMode, TimeSeriesView, compute_block_bounds,
};

const VAR_FLOOR: f64 = f64::EPSILON * 1e6;

fn normalize_variance(raw_var: f64) -> f64 {
    if raw_var.is_nan() || raw_var <= VAR_FLOOR {
        VAR_FLOOR
    } else if raw_var == f64::INFINITY {
        f64::MAX
    } else {
        raw_var
    }
}

/// Gaussian mean/variance merge cost: `m * ln(var)` per dimension over the
/// merged sample range, with the variance floored to stay finite on flat runs.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockNormalCost {
    bounds: Vec<BlockBounds>,
    stats: PrefixStats,
}

impl BlockNormalCost {
    pub fn new(x: &TimeSeriesView<'_>, n_blocks: usize) -> Result<Self, BlockMergeError> {
        Self::with_repro_mode(x, n_blocks, ReproMode::default())
    }

    pub fn with_repro_mode(
        x: &TimeSeriesView<'_>,
        n_blocks: usize,
        repro_mode: ReproMode,
    ) -> Result<Self, BlockMergeError> {
        let bounds = compute_block_bounds(x.n, n_blocks)?;
        let stats = PrefixStats::new(x, repro_mode)?;
        Ok(Self { bounds, stats })
    }

    pub fn bounds(&self) -> &[BlockBounds] {
        &self.bounds
    }

    pub fn n_blocks(&self) -> usize {
        self.bounds.len()
    }
}

impl CostFunction for BlockNormalCost {
    fn name(&self) -> &'static str {
        "block_normal"
    }

    fn n_blocks(&self) -> Option<usize> {
        Some(self.bounds.len())
    }

    fn cost(&self, pattern: Pattern, series: &TimeSeriesView<'_>) -> f64 {
        debug_assert_eq!(series.n, self.stats.n(), "cost called with a different series");
        assert!(
            pattern.is_valid(self.n_blocks()),
            "pattern {pattern} outside block space n_blocks={}",
            self.n_blocks()
        );

        let start = self.bounds[pattern.position].first;
        let end = self.bounds[pattern.last_block()].last + 1;
        let m = (end - start) as f64;

        (0..self.stats.d())
            .map(|dim| {
                let (sum, sum_sq) = self.stats.range_sums(dim, start..end);
                let mean = sum / m;
                let var = normalize_variance(sum_sq / m - mean * mean);
                m * var.ln()
            })
            .sum()
    }
}
