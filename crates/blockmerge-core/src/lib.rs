// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Shared types for block-merging segmentations: block partitions, the dense
//! pattern key bijection and the pattern enumerator that follows it.

pub mod blocks;
pub mod diagnostics;
pub mod error;
pub mod hash;
pub mod pattern;
pub mod repro;
pub mod time_series;

pub use blocks::{
    BlockBounds, compute_block_bounds, pattern_sample_range, validate_block_count,
};
pub use diagnostics::{BuildDiagnostics, DIAGNOSTICS_SCHEMA_VERSION};
pub use error::BlockMergeError;
pub use hash::{CanonicalHash, HashFunction};
pub use pattern::{
    Pattern, PatternIter, enumerate_patterns, hash_pattern, total_patterns, try_hash_pattern,
    unhash_pattern,
};
pub use repro::{
    ReproMode, prefix_sum_squares, prefix_sum_squares_kahan, prefix_sums, prefix_sums_kahan,
};
pub use time_series::{DTypeView, MemoryLayout, TimeSeriesView};
