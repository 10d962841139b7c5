// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use blockmerge_core::{Pattern, TimeSeriesView};

/// Merge cost of a block pattern.
///
/// Implementations must be deterministic and side-effect free: a table build
/// evaluates each pattern exactly once, possibly from several threads.
pub trait CostFunction {
    fn name(&self) -> &'static str {
        "custom"
    }

    /// Block count the function was prepared for, if it is tied to one.
    ///
    /// Table builders reject a mismatching `n_blocks` before evaluating any
    /// pattern.
    fn n_blocks(&self) -> Option<usize> {
        None
    }

    /// Cost of merging the blocks of `pattern` into a single run.
    fn cost(&self, pattern: Pattern, series: &TimeSeriesView<'_>) -> f64;
}

impl<F> CostFunction for F
where
    F: Fn(Pattern, &TimeSeriesView<'_>) -> f64,
{
    fn cost(&self, pattern: Pattern, series: &TimeSeriesView<'_>) -> f64 {
        self(pattern, series)
    }
}
