// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Cost tables over block patterns and the segmentation loss built on them.
//!
//! A table is built once per `(series, n_blocks, cost function)`; afterwards
//! any number of decision strings can be translated into pattern keys and
//! scored against it, from as many threads as needed.

pub mod config;
pub mod loss;
pub mod table;
pub mod translate;

pub use blockmerge_core::{
    BlockBounds, BlockMergeError, CanonicalHash, HashFunction, Pattern, compute_block_bounds,
    enumerate_patterns, hash_pattern,
};
pub use blockmerge_costs::CostFunction;
pub use config::CostTableConfig;
pub use loss::{LossEvaluator, evaluate_loss, evaluate_loss_batch};
pub use table::{CostTable, CostTableBuilder, build_canonical_table, build_cost_table};
pub use translate::{
    SegmentationTranslator, decompose, encode_patterns, sample_breakpoints, translate,
    translate_into,
};
