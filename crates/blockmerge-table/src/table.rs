// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::config::CostTableConfig;
use blockmerge_core::{
    BlockMergeError, BuildDiagnostics, CanonicalHash, HashFunction, Pattern, TimeSeriesView,
    enumerate_patterns, total_patterns, try_hash_pattern, validate_block_count,
};
use blockmerge_costs::CostFunction;
use std::borrow::Cow;
use std::collections::HashMap;
use std::mem::size_of;
use std::time::Instant;
use tracing::{debug, warn};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Maps the keys of a non-canonical hash function to canonical slots.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[derive(Clone, Debug, PartialEq)]
enum KeyIndex {
    /// Keys form a permutation of `[0, total_patterns)`.
    Dense(Vec<usize>),
    /// Unique keys outside the dense range.
    Sparse(HashMap<usize, usize>),
}

impl KeyIndex {
    fn slot(&self, key: usize) -> Option<usize> {
        match self {
            Self::Dense(slots) => slots.get(key).copied(),
            Self::Sparse(slots) => slots.get(&key).copied(),
        }
    }

    fn validate(&self, total: usize) -> Result<(), BlockMergeError> {
        let slots: Vec<usize> = match self {
            Self::Dense(slots) => slots.clone(),
            Self::Sparse(slots) => slots.values().copied().collect(),
        };
        if slots.len() != total {
            return Err(BlockMergeError::invalid_input(format!(
                "key index length mismatch: got {}, expected {total}",
                slots.len()
            )));
        }
        let mut seen = vec![false; total];
        for slot in slots {
            let Some(taken) = seen.get_mut(slot).filter(|taken| !**taken) else {
                return Err(BlockMergeError::invalid_input(format!(
                    "key index must map onto each of the {total} slots exactly once; slot {slot} is out of range or repeated"
                )));
            };
            *taken = true;
        }
        Ok(())
    }
}

/// Pattern costs stored densely in canonical key order.
///
/// The table always holds exactly `total_patterns(n_blocks)` costs and is
/// never mutated after a build. A table built with a non-canonical hash
/// function also keeps that function's keys, so [`CostTable::get`] answers in
/// the build-time key space while translation and [`CostTable::pattern_cost`]
/// keep using the canonical one.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "CostTableWire", into = "CostTableWire")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct CostTable {
    n_blocks: usize,
    costs: Vec<f64>,
    key_index: Option<KeyIndex>,
    diagnostics: BuildDiagnostics,
}

#[allow(clippy::len_without_is_empty)]
impl CostTable {
    /// Reassembles a canonically keyed table, checking that `costs` covers the
    /// dense key range.
    pub fn from_parts(
        n_blocks: usize,
        costs: Vec<f64>,
        diagnostics: BuildDiagnostics,
    ) -> Result<Self, BlockMergeError> {
        Self::assemble(n_blocks, costs, None, diagnostics)
    }

    fn assemble(
        n_blocks: usize,
        costs: Vec<f64>,
        key_index: Option<KeyIndex>,
        diagnostics: BuildDiagnostics,
    ) -> Result<Self, BlockMergeError> {
        if n_blocks == 0 {
            return Err(BlockMergeError::invalid_configuration(
                "n_blocks must be >= 1; got 0",
            ));
        }
        let expected = total_patterns(n_blocks)?;
        if costs.len() != expected {
            return Err(BlockMergeError::invalid_input(format!(
                "cost table length mismatch: got {}, expected {expected} for n_blocks={n_blocks}",
                costs.len()
            )));
        }
        if let Some(index) = &key_index {
            index.validate(expected)?;
        }
        Ok(Self {
            n_blocks,
            costs,
            key_index,
            diagnostics,
        })
    }

    pub fn n_blocks(&self) -> usize {
        self.n_blocks
    }

    /// Number of stored patterns; never zero.
    pub fn len(&self) -> usize {
        self.costs.len()
    }

    /// Whether the build-time keys are the canonical ones.
    pub fn has_canonical_keys(&self) -> bool {
        self.key_index.is_none()
    }

    /// Cost stored under `key` of the hash function the table was built with.
    pub fn get(&self, key: usize) -> Option<f64> {
        let slot = match &self.key_index {
            None => key,
            Some(index) => index.slot(key)?,
        };
        self.costs.get(slot).copied()
    }

    /// Cost of the canonical `key`, as produced by the segmentation translator.
    pub(crate) fn canonical_cost(&self, key: usize) -> Option<f64> {
        self.costs.get(key).copied()
    }

    /// Cost of `pattern`, whatever hash function the table was built with.
    pub fn pattern_cost(&self, pattern: Pattern) -> Result<f64, BlockMergeError> {
        let key = try_hash_pattern(pattern.position, pattern.length, self.n_blocks)?;
        self.canonical_cost(key)
            .ok_or_else(|| BlockMergeError::missing_key(key, self.n_blocks, self.n_blocks))
    }

    /// Costs in canonical key order.
    pub fn as_slice(&self) -> &[f64] {
        &self.costs
    }

    pub fn diagnostics(&self) -> &BuildDiagnostics {
        &self.diagnostics
    }

    /// Canonically ordered costs; build-time custom keys are dropped.
    pub fn into_parts(self) -> (usize, Vec<f64>, BuildDiagnostics) {
        (self.n_blocks, self.costs, self.diagnostics)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct CostTableWire {
    n_blocks: usize,
    costs: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key_index: Option<KeyIndex>,
    diagnostics: BuildDiagnostics,
}

#[cfg(feature = "serde")]
impl TryFrom<CostTableWire> for CostTable {
    type Error = BlockMergeError;

    fn try_from(wire: CostTableWire) -> Result<Self, Self::Error> {
        Self::assemble(wire.n_blocks, wire.costs, wire.key_index, wire.diagnostics)
    }
}

#[cfg(feature = "serde")]
impl From<CostTable> for CostTableWire {
    fn from(table: CostTable) -> Self {
        Self {
            n_blocks: table.n_blocks,
            costs: table.costs,
            key_index: table.key_index,
            diagnostics: table.diagnostics,
        }
    }
}

/// Evaluates a cost function once per pattern and stores the results.
#[derive(Clone, Debug, Default)]
pub struct CostTableBuilder {
    config: CostTableConfig,
}

impl CostTableBuilder {
    pub fn new(config: CostTableConfig) -> Result<Self, BlockMergeError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CostTableConfig {
        &self.config
    }

    /// Builds the table for `series` split into `n_blocks` blocks.
    ///
    /// Keys of a non-canonical `hash_fn` are assigned and checked for
    /// uniqueness before any cost is evaluated, so a colliding hash function
    /// fails without paying for the costs.
    pub fn build<C, H>(
        &self,
        series: &TimeSeriesView<'_>,
        n_blocks: usize,
        cost_fn: &C,
        hash_fn: &H,
    ) -> Result<CostTable, BlockMergeError>
    where
        C: CostFunction + Sync + ?Sized,
        H: HashFunction + ?Sized,
    {
        let started_at = Instant::now();
        validate_block_count(series.n, n_blocks)?;
        if let Some(prepared) = cost_fn.n_blocks()
            && prepared != n_blocks
        {
            return Err(BlockMergeError::invalid_configuration(format!(
                "cost function {} was prepared for n_blocks={prepared}, but the table is built for n_blocks={n_blocks}",
                cost_fn.name()
            )));
        }
        let total = total_patterns(n_blocks)?;
        let index_entry_bytes = if hash_fn.is_canonical() {
            0
        } else {
            size_of::<usize>()
        };
        self.enforce_memory_budget(total, size_of::<f64>() + index_entry_bytes)?;

        debug!(
            n = series.n,
            d = series.d,
            n_blocks,
            total_patterns = total,
            cost_function = cost_fn.name(),
            hash_function = hash_fn.name(),
            "building cost table"
        );

        let key_index = if hash_fn.is_canonical() {
            None
        } else {
            index_keys(n_blocks, total, hash_fn)?
        };
        if let Some(KeyIndex::Sparse(_)) = &key_index {
            debug!(n_blocks, "hash keys are not dense; indexing them through a map");
            self.enforce_memory_budget(
                total,
                size_of::<f64>() + size_of::<(usize, usize)>(),
            )?;
        }

        let (costs, thread_count) = self.evaluate_costs(series, n_blocks, cost_fn);

        let mut warnings = vec![];
        for (pattern, &cost) in enumerate_patterns(n_blocks).zip(&costs) {
            if !cost.is_finite() {
                if !self.config.allow_non_finite {
                    return Err(BlockMergeError::numerical_issue(format!(
                        "non-finite cost for pattern {pattern}: {cost}"
                    )));
                }
                warn!(%pattern, cost, "admitting non-finite pattern cost");
                warnings.push(format!("non-finite cost for pattern {pattern}: {cost}"));
            }
        }

        let runtime_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(
            n_blocks,
            total_patterns = total,
            elapsed_ms = runtime_ms,
            warnings = warnings.len(),
            "cost table built"
        );

        let diagnostics = BuildDiagnostics {
            n: series.n,
            d: series.d,
            n_blocks,
            total_patterns: total,
            cost_evals: total,
            runtime_ms: Some(runtime_ms),
            thread_count,
            cost_function: Cow::Borrowed(cost_fn.name()),
            hash_function: Cow::Borrowed(hash_fn.name()),
            repro_mode: self.config.repro_mode,
            warnings,
            ..BuildDiagnostics::default()
        };

        Ok(CostTable {
            n_blocks,
            costs,
            key_index,
            diagnostics,
        })
    }

    fn enforce_memory_budget(
        &self,
        total: usize,
        bytes_per_pattern: usize,
    ) -> Result<(), BlockMergeError> {
        let required_bytes = total.checked_mul(bytes_per_pattern).ok_or_else(|| {
            BlockMergeError::resource_limit(format!(
                "cost table byte count overflows usize for total_patterns={total}"
            ))
        })?;
        if let Some(limit_bytes) = self.config.memory_budget_bytes
            && required_bytes > limit_bytes
        {
            return Err(BlockMergeError::resource_limit(format!(
                "memory_budget_bytes exceeded for cost table: required_bytes={required_bytes}, limit_bytes={limit_bytes}; reduce n_blocks or raise memory_budget_bytes"
            )));
        }
        Ok(())
    }

    /// Costs in enumeration order, plus the worker count when run in parallel.
    fn evaluate_costs<C>(
        &self,
        series: &TimeSeriesView<'_>,
        n_blocks: usize,
        cost_fn: &C,
    ) -> (Vec<f64>, Option<usize>)
    where
        C: CostFunction + Sync + ?Sized,
    {
        #[cfg(feature = "rayon")]
        if self.config.use_parallel() {
            let patterns: Vec<Pattern> = enumerate_patterns(n_blocks).collect();
            let costs = patterns
                .par_iter()
                .map(|&pattern| cost_fn.cost(pattern, series))
                .collect();
            return (costs, Some(rayon::current_num_threads()));
        }

        debug_assert!(!self.config.use_parallel());
        let costs = enumerate_patterns(n_blocks)
            .map(|pattern| cost_fn.cost(pattern, series))
            .collect();
        (costs, None)
    }
}

/// Hashes every pattern in enumeration order and maps each key to the
/// pattern's canonical slot, rejecting collisions.
///
/// Returns `None` when the keys turn out to be the canonical ones.
fn index_keys<H>(
    n_blocks: usize,
    total: usize,
    hash_fn: &H,
) -> Result<Option<KeyIndex>, BlockMergeError>
where
    H: HashFunction + ?Sized,
{
    let mut dense_owners: Vec<Option<Pattern>> = vec![None; total];
    let mut sparse_owners: HashMap<usize, Pattern> = HashMap::new();
    let mut keys = Vec::with_capacity(total);

    for pattern in enumerate_patterns(n_blocks) {
        let key = hash_fn.hash(pattern, n_blocks);
        let first = match dense_owners.get_mut(key) {
            Some(owner) => owner.replace(pattern),
            None => sparse_owners.insert(key, pattern),
        };
        if let Some(first) = first {
            return Err(BlockMergeError::duplicate_key(key, first, pattern));
        }
        keys.push(key);
    }

    if !sparse_owners.is_empty() {
        let slots = keys
            .into_iter()
            .enumerate()
            .map(|(slot, key)| (key, slot))
            .collect();
        return Ok(Some(KeyIndex::Sparse(slots)));
    }

    // Unique keys that all fit `[0, total)` are a permutation of it.
    if keys.iter().enumerate().all(|(slot, &key)| slot == key) {
        return Ok(None);
    }
    let mut slots = vec![0; total];
    for (slot, key) in keys.into_iter().enumerate() {
        slots[key] = slot;
    }
    Ok(Some(KeyIndex::Dense(slots)))
}

/// Builds a table with the default configuration.
pub fn build_cost_table<C, H>(
    series: &TimeSeriesView<'_>,
    n_blocks: usize,
    cost_fn: &C,
    hash_fn: &H,
) -> Result<CostTable, BlockMergeError>
where
    C: CostFunction + Sync + ?Sized,
    H: HashFunction + ?Sized,
{
    CostTableBuilder::default().build(series, n_blocks, cost_fn, hash_fn)
}

/// Builds a table keyed by the canonical bijection.
pub fn build_canonical_table<C>(
    series: &TimeSeriesView<'_>,
    n_blocks: usize,
    cost_fn: &C,
) -> Result<CostTable, BlockMergeError>
where
    C: CostFunction + Sync + ?Sized,
{
    build_cost_table(series, n_blocks, cost_fn, &CanonicalHash)
}
