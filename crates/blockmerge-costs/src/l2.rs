// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::model::CostFunction;
use crate::stats::PrefixStats;
use blockmerge_core::{
    BlockBounds, BlockMergeError, Pattern, ReproMode, TimeSeriesView, compute_block_bounds,
};

/// Least-squares merge cost: residual sum of squares around the mean of the
/// merged sample range, summed over dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockL2Cost {
    bounds: Vec<BlockBounds>,
    stats: PrefixStats,
    repro_mode: ReproMode,
}

impl BlockL2Cost {
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
        Ok(Self {
            bounds,
            stats,
            repro_mode,
        })
    }

    pub fn bounds(&self) -> &[BlockBounds] {
        &self.bounds
    }

    pub fn n_blocks(&self) -> usize {
        self.bounds.len()
    }

    pub fn repro_mode(&self) -> ReproMode {
        self.repro_mode
    }
}

impl CostFunction for BlockL2Cost {
    fn name(&self) -> &'static str {
        "block_l2"
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

        let total: f64 = (0..self.stats.d())
            .map(|dim| {
                let (sum, sum_sq) = self.stats.range_sums(dim, start..end);
                sum_sq - (sum * sum) / m
            })
            .sum();
        total.max(0.0)
    }
}
