// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::error::BlockMergeError;
use std::fmt;
use std::iter::FusedIterator;

/// A run of `length` consecutive blocks starting at block `position`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pattern {
    pub position: usize,
    pub length: usize,
}

impl Pattern {
    pub const fn new(position: usize, length: usize) -> Self {
        Self { position, length }
    }

    /// Exclusive end block.
    pub const fn end(&self) -> usize {
        self.position + self.length
    }

    /// Inclusive last block.
    pub const fn last_block(&self) -> usize {
        self.position + self.length - 1
    }

    pub const fn contains(&self, block: usize) -> bool {
        block >= self.position && block < self.end()
    }

    pub const fn is_singleton(&self) -> bool {
        self.length == 1
    }

    pub fn is_valid(&self, n_blocks: usize) -> bool {
        self.length >= 1
            && self
                .position
                .checked_add(self.length)
                .is_some_and(|end| end <= n_blocks)
    }

    /// Checks `length >= 1` and `position + length <= n_blocks`.
    pub fn validate(&self, n_blocks: usize) -> Result<(), BlockMergeError> {
        if self.is_valid(n_blocks) {
            Ok(())
        } else {
            Err(BlockMergeError::invalid_input(format!(
                "pattern {self} does not fit a block space of n_blocks={n_blocks}"
            )))
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(position={}, length={})", self.position, self.length)
    }
}

/// Number of valid patterns in a block space: `n_blocks * (n_blocks + 1) / 2`.
pub fn total_patterns(n_blocks: usize) -> Result<usize, BlockMergeError> {
    triangular(n_blocks).ok_or_else(|| {
        BlockMergeError::resource_limit(format!(
            "total pattern count overflows usize for n_blocks={n_blocks}"
        ))
    })
}

/// `k * (k + 1) / 2`, halving the even factor first so only the result can overflow.
fn triangular(k: usize) -> Option<usize> {
    let next = k.checked_add(1)?;
    if k % 2 == 0 {
        (k / 2).checked_mul(next)
    } else {
        k.checked_mul(next / 2)
    }
}

/// Dense key of the pattern `(position, length)` in a space of `n_blocks` blocks.
///
/// Keys are ordered by length first and position second; all patterns of
/// length `l` occupy `n_blocks - l + 1` consecutive keys starting at the
/// triangular offset `(l - 1) * (2 * n_blocks - l + 2) / 2`. The product is
/// always even because exactly one of `l - 1` and `2 * n_blocks - l + 2` is.
///
/// The caller guarantees the pattern is valid; see [`try_hash_pattern`].
#[inline]
pub fn hash_pattern(position: usize, length: usize, n_blocks: usize) -> usize {
    debug_assert!(
        Pattern::new(position, length).is_valid(n_blocks),
        "hash_pattern requires a valid pattern; got position={position}, length={length}, n_blocks={n_blocks}"
    );
    (length - 1) * (2 * n_blocks + 2 - length) / 2 + position
}

/// Validated variant of [`hash_pattern`].
pub fn try_hash_pattern(
    position: usize,
    length: usize,
    n_blocks: usize,
) -> Result<usize, BlockMergeError> {
    Pattern::new(position, length).validate(n_blocks)?;
    total_patterns(n_blocks)?;
    Ok(hash_pattern(position, length, n_blocks))
}

/// Inverse of [`hash_pattern`]; `None` when `key >= total_patterns(n_blocks)`.
pub fn unhash_pattern(key: usize, n_blocks: usize) -> Option<Pattern> {
    let mut remaining = key;
    for length in 1..=n_blocks {
        let count = n_blocks - length + 1;
        if remaining < count {
            return Some(Pattern::new(remaining, length));
        }
        remaining -= count;
    }
    None
}

/// Every valid pattern of `n_blocks` blocks in key order.
pub fn enumerate_patterns(n_blocks: usize) -> PatternIter {
    PatternIter::new(n_blocks)
}

/// Lazy length-major, position-minor pattern sequence.
///
/// Cloning yields an independent cursor, so a fresh enumeration is always one
/// `enumerate_patterns` call (or `clone`) away.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternIter {
    n_blocks: usize,
    position: usize,
    length: usize,
}

impl PatternIter {
    fn new(n_blocks: usize) -> Self {
        Self {
            n_blocks,
            position: 0,
            length: 1,
        }
    }

    pub fn n_blocks(&self) -> usize {
        self.n_blocks
    }

    fn remaining(&self) -> usize {
        if self.length > self.n_blocks {
            return 0;
        }
        // Rest of the current length plus every longer length.
        let longer = self.n_blocks - self.length;
        let current = self.n_blocks - self.length + 1 - self.position;
        // Saturates for block spaces whose pattern count exceeds usize.
        triangular(longer)
            .and_then(|total| total.checked_add(current))
            .unwrap_or(usize::MAX)
    }
}

impl Iterator for PatternIter {
    type Item = Pattern;

    fn next(&mut self) -> Option<Self::Item> {
        if self.length > self.n_blocks {
            return None;
        }

        let pattern = Pattern::new(self.position, self.length);
        if self.position + self.length == self.n_blocks {
            self.length += 1;
            self.position = 0;
        } else {
            self.position += 1;
        }
        Some(pattern)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PatternIter {}

impl FusedIterator for PatternIter {}
