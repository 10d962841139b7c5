// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::table::CostTable;
use crate::translate::translate_into;
use blockmerge_core::BlockMergeError;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

fn sum_keys(keys: &[usize], n_blocks: usize, table: &CostTable) -> Result<f64, BlockMergeError> {
    let table_n_blocks = table.n_blocks();
    keys.iter().try_fold(0.0, |acc, &key| {
        let cost = if n_blocks == table_n_blocks {
            table.canonical_cost(key)
        } else {
            None
        };
        cost.map(|cost| acc + cost)
            .ok_or_else(|| BlockMergeError::missing_key(key, n_blocks, table_n_blocks))
    })
}

/// Total cost of the segmentation `decisions` (block count `decisions.len() + 1`).
///
/// Keys are only meaningful for the block space the table was built for, so a
/// decision string of the wrong length fails with `MissingKey` instead of
/// reading entries of another layout. Tables built with a custom hash function
/// are scored the same way; their costs are stored in canonical order.
pub fn evaluate_loss(decisions: &[u8], table: &CostTable) -> Result<f64, BlockMergeError> {
    let mut keys = Vec::with_capacity(decisions.len() + 1);
    evaluate_with_buffer(decisions, table, &mut keys)
}

fn evaluate_with_buffer(
    decisions: &[u8],
    table: &CostTable,
    keys: &mut Vec<usize>,
) -> Result<f64, BlockMergeError> {
    let n_blocks = decisions.len() + 1;
    translate_into(decisions, n_blocks, keys)?;
    sum_keys(keys, n_blocks, table)
}

/// Losses of many candidate segmentations against one table.
pub fn evaluate_loss_batch<D>(candidates: &[D], table: &CostTable) -> Result<Vec<f64>, BlockMergeError>
where
    D: AsRef<[u8]> + Sync,
{
    #[cfg(feature = "rayon")]
    let losses: Result<Vec<f64>, BlockMergeError> = candidates
        .par_iter()
        .map_init(Vec::new, |keys, decisions| {
            evaluate_with_buffer(decisions.as_ref(), table, keys)
        })
        .collect();

    #[cfg(not(feature = "rayon"))]
    let losses: Result<Vec<f64>, BlockMergeError> = {
        let mut evaluator = LossEvaluator::new(table);
        candidates
            .iter()
            .map(|decisions| evaluator.evaluate(decisions.as_ref()))
            .collect()
    };

    losses
}

/// Evaluates many segmentations against one table without reallocating.
#[derive(Clone, Debug)]
pub struct LossEvaluator<'t> {
    table: &'t CostTable,
    keys: Vec<usize>,
}

impl<'t> LossEvaluator<'t> {
    pub fn new(table: &'t CostTable) -> Self {
        Self {
            table,
            keys: Vec::with_capacity(table.n_blocks()),
        }
    }

    pub fn table(&self) -> &'t CostTable {
        self.table
    }

    pub fn evaluate(&mut self, decisions: &[u8]) -> Result<f64, BlockMergeError> {
        evaluate_with_buffer(decisions, self.table, &mut self.keys)
    }

    /// Keys produced by the most recent translation.
    pub fn last_keys(&self) -> &[usize] {
        &self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::{LossEvaluator, evaluate_loss, evaluate_loss_batch};
    use crate::table::{build_canonical_table, build_cost_table};
    use blockmerge_core::{BlockMergeError, CanonicalHash, HashFunction, Pattern, TimeSeriesView};

    fn encode_cost(pattern: Pattern, _series: &TimeSeriesView<'_>) -> f64 {
        (pattern.position * 10 + pattern.length) as f64
    }

    fn table_for(n_blocks: usize) -> crate::table::CostTable {
        let values = vec![0.0; n_blocks * 2];
        let view = TimeSeriesView::univariate(&values).expect("view");
        build_canonical_table(&view, n_blocks, &encode_cost).expect("build")
    }

    #[test]
    fn merge_gap_merge_sums_two_pairs() {
        let table = table_for(4);
        let loss = evaluate_loss(&[1, 0, 1], &table).expect("valid");
        let expected = table.pattern_cost(Pattern::new(0, 2)).expect("(0,2)")
            + table.pattern_cost(Pattern::new(2, 2)).expect("(2,2)");
        assert_eq!(loss, expected);
        assert_eq!(loss, 2.0 + 22.0);
    }

    #[test]
    fn all_zero_sums_singletons_and_all_one_reads_full_span() {
        let table = table_for(5);
        assert_eq!(
            evaluate_loss(&[0, 0, 0, 0], &table).expect("valid"),
            1.0 + 11.0 + 21.0 + 31.0 + 41.0
        );
        assert_eq!(evaluate_loss(&[1, 1, 1, 1], &table).expect("valid"), 5.0);
    }

    #[test]
    fn single_block_returns_only_entry() {
        let table = table_for(1);
        assert_eq!(table.len(), 1);
        assert_eq!(evaluate_loss(&[], &table).expect("valid"), 1.0);
    }

    #[test]
    fn tables_built_with_custom_hashes_score_by_pattern() {
        let values = vec![0.0; 8];
        let view = TimeSeriesView::univariate(&values).expect("view");
        let reversed = |pattern: Pattern, n_blocks: usize| {
            n_blocks * (n_blocks + 1) / 2 - 1 - CanonicalHash.hash(pattern, n_blocks)
        };
        let offset = |pattern: Pattern, n_blocks: usize| 1000 + CanonicalHash.hash(pattern, n_blocks);

        let reversed_table = build_cost_table(&view, 4, &encode_cost, &reversed).expect("build");
        let offset_table = build_cost_table(&view, 4, &encode_cost, &offset).expect("build");
        let canonical = table_for(4);

        for table in [&reversed_table, &offset_table] {
            assert_eq!(evaluate_loss(&[1, 1, 1], table).expect("full span"), 4.0);
            assert_eq!(evaluate_loss(&[1, 0, 1], table).expect("two pairs"), 2.0 + 22.0);
            for decisions in [[0, 0, 0], [0, 1, 0], [1, 1, 0], [0, 0, 1]] {
                assert_eq!(
                    evaluate_loss(&decisions, table).expect("custom"),
                    evaluate_loss(&decisions, &canonical).expect("canonical")
                );
            }
        }
    }

    #[test]
    fn block_count_mismatch_is_missing_key() {
        let table = table_for(5);
        let err = evaluate_loss(&[1, 0, 1], &table).expect_err("n_blocks=4 vs 5 must fail");
        assert_eq!(err, BlockMergeError::missing_key(4, 4, 5));

        let err = evaluate_loss(&[0; 6], &table).expect_err("n_blocks=7 vs 5 must fail");
        assert!(matches!(
            err,
            BlockMergeError::MissingKey {
                key: 0,
                n_blocks: 7,
                table_n_blocks: 5
            }
        ));
    }

    #[test]
    fn malformed_decisions_are_invalid_input() {
        let table = table_for(4);
        let err = evaluate_loss(&[1, 3, 0], &table).expect_err("byte 3 must fail");
        assert!(matches!(err, BlockMergeError::InvalidInput(_)));
    }

    #[test]
    fn evaluator_and_batch_match_single_calls() {
        let table = table_for(6);
        let candidates: Vec<Vec<u8>> = vec![
            vec![0, 0, 0, 0, 0],
            vec![1, 1, 1, 1, 1],
            vec![1, 0, 1, 0, 1],
            vec![0, 1, 1, 0, 0],
        ];

        let mut evaluator = LossEvaluator::new(&table);
        let batch = evaluate_loss_batch(&candidates, &table).expect("batch");
        for (decisions, batch_loss) in candidates.iter().zip(&batch) {
            let single = evaluate_loss(decisions, &table).expect("single");
            assert_eq!(evaluator.evaluate(decisions).expect("evaluator"), single);
            assert_eq!(*batch_loss, single);
        }
        assert_eq!(evaluator.last_keys(), &[0, 12, 4, 5]);
        assert_eq!(evaluator.table().n_blocks(), 6);

        let mixed: Vec<&[u8]> = vec![&[0, 0, 0, 0, 0], &[0, 0]];
        assert!(evaluate_loss_batch(&mixed, &table).is_err());
    }
}
