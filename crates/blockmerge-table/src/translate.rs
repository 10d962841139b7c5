// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use blockmerge_core::{
    BlockBounds, BlockMergeError, Pattern, hash_pattern, pattern_sample_range, total_patterns,
};

fn check_block_space(decisions: &[u8], n_blocks: usize) -> Result<(), BlockMergeError> {
    if n_blocks == 0 {
        return Err(BlockMergeError::invalid_configuration(
            "n_blocks must be >= 1; got 0",
        ));
    }
    if decisions.len() != n_blocks - 1 {
        return Err(BlockMergeError::invalid_input(format!(
            "decision length mismatch: got {}, expected n_blocks - 1 = {}",
            decisions.len(),
            n_blocks - 1
        )));
    }
    Ok(())
}

/// Walks `decisions` once and emits the patterns they imply, left to right.
///
/// A `1` at boundary `i` merges blocks `i` and `i + 1`; a maximal run of ones
/// starting at boundary `pos` becomes the pattern `(pos, ones + 1)`. Every
/// block outside such a run is emitted as a singleton.
fn scan_runs(
    decisions: &[u8],
    mut emit: impl FnMut(Pattern),
) -> Result<(), BlockMergeError> {
    let mut in_run = false;
    let mut pos = 0usize;
    let mut length = 1usize;

    for (i, &decision) in decisions.iter().enumerate() {
        match decision {
            1 => {
                if !in_run {
                    pos = i;
                    in_run = true;
                }
                length += 1;
            }
            0 => {
                if length > 1 {
                    emit(Pattern::new(pos, length));
                    length = 1;
                    in_run = false;
                } else {
                    emit(Pattern::new(i, 1));
                }
            }
            other => {
                return Err(BlockMergeError::invalid_input(format!(
                    "decisions must contain only 0/1 bytes: index {i} has {other}"
                )));
            }
        }
    }

    // Final block: close an open run or emit the trailing singleton.
    if length > 1 {
        emit(Pattern::new(pos, length));
    } else {
        emit(Pattern::new(decisions.len(), 1));
    }
    Ok(())
}

#[inline]
fn pattern_key(pattern: Pattern, n_blocks: usize) -> usize {
    if pattern.length == 1 {
        // Singletons occupy keys [0, n_blocks) in position order.
        pattern.position
    } else {
        hash_pattern(pattern.position, pattern.length, n_blocks)
    }
}

/// Appends the keys implied by `decisions` to `out` after clearing it.
pub fn translate_into(
    decisions: &[u8],
    n_blocks: usize,
    out: &mut Vec<usize>,
) -> Result<(), BlockMergeError> {
    check_block_space(decisions, n_blocks)?;
    out.clear();
    let scanned = scan_runs(decisions, |pattern| out.push(pattern_key(pattern, n_blocks)));
    if scanned.is_err() {
        out.clear();
    }
    scanned
}

/// Keys of the patterns implied by a segmentation of `n_blocks` blocks.
pub fn translate(decisions: &[u8], n_blocks: usize) -> Result<Vec<usize>, BlockMergeError> {
    let mut keys = Vec::with_capacity(n_blocks);
    translate_into(decisions, n_blocks, &mut keys)?;
    Ok(keys)
}

/// Patterns implied by a segmentation of `n_blocks` blocks.
pub fn decompose(decisions: &[u8], n_blocks: usize) -> Result<Vec<Pattern>, BlockMergeError> {
    check_block_space(decisions, n_blocks)?;
    let mut patterns = Vec::with_capacity(n_blocks);
    scan_runs(decisions, |pattern| patterns.push(pattern))?;
    Ok(patterns)
}

/// Inverse of [`decompose`]: the decision string of an ordered partition.
pub fn encode_patterns(patterns: &[Pattern], n_blocks: usize) -> Result<Vec<u8>, BlockMergeError> {
    if n_blocks == 0 {
        return Err(BlockMergeError::invalid_configuration(
            "n_blocks must be >= 1; got 0",
        ));
    }

    let mut decisions = vec![0u8; n_blocks - 1];
    let mut next_block = 0usize;
    for &pattern in patterns {
        pattern.validate(n_blocks)?;
        if pattern.position != next_block {
            return Err(BlockMergeError::invalid_input(format!(
                "patterns must partition the blocks in order: expected a pattern at block {next_block}, got {pattern}"
            )));
        }
        decisions[pattern.position..pattern.last_block()].fill(1);
        next_block = pattern.end();
    }
    if next_block != n_blocks {
        return Err(BlockMergeError::invalid_input(format!(
            "patterns cover blocks [0, {next_block}) but n_blocks={n_blocks}"
        )));
    }
    Ok(decisions)
}

/// Exclusive sample end of every pattern; the last entry equals the series length.
pub fn sample_breakpoints(
    patterns: &[Pattern],
    bounds: &[BlockBounds],
) -> Result<Vec<usize>, BlockMergeError> {
    patterns
        .iter()
        .map(|&pattern| pattern_sample_range(bounds, pattern).map(|range| range.end))
        .collect()
}

/// Reusable translator for one block space.
///
/// Keeps its key buffer between calls so repeated translations inside a
/// search loop do not allocate.
#[derive(Clone, Debug)]
pub struct SegmentationTranslator {
    n_blocks: usize,
    keys: Vec<usize>,
}

impl SegmentationTranslator {
    pub fn new(n_blocks: usize) -> Result<Self, BlockMergeError> {
        if n_blocks == 0 {
            return Err(BlockMergeError::invalid_configuration(
                "n_blocks must be >= 1; got 0",
            ));
        }
        total_patterns(n_blocks)?;
        Ok(Self {
            n_blocks,
            keys: Vec::with_capacity(n_blocks),
        })
    }

    pub fn n_blocks(&self) -> usize {
        self.n_blocks
    }

    pub fn translate(&mut self, decisions: &[u8]) -> Result<&[usize], BlockMergeError> {
        translate_into(decisions, self.n_blocks, &mut self.keys)?;
        Ok(&self.keys)
    }
}
