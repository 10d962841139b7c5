// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::pattern::{Pattern, hash_pattern};

/// Assigns table keys to patterns.
///
/// Implementations must be deterministic. Table builders only rely on keys
/// being unique per pattern; they need not be dense.
pub trait HashFunction {
    fn name(&self) -> &'static str {
        "custom"
    }

    /// Whether keys agree with [`hash_pattern`] for every valid pattern.
    fn is_canonical(&self) -> bool {
        false
    }

    fn hash(&self, pattern: Pattern, n_blocks: usize) -> usize;
}

/// The closed-form triangular bijection of [`hash_pattern`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CanonicalHash;

impl HashFunction for CanonicalHash {
    fn name(&self) -> &'static str {
        "canonical"
    }

    fn is_canonical(&self) -> bool {
        true
    }

    #[inline]
    fn hash(&self, pattern: Pattern, n_blocks: usize) -> usize {
        hash_pattern(pattern.position, pattern.length, n_blocks)
    }
}

impl<F> HashFunction for F
where
    F: Fn(Pattern, usize) -> usize,
{
    fn hash(&self, pattern: Pattern, n_blocks: usize) -> usize {
        self(pattern, n_blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::{CanonicalHash, HashFunction};
    use crate::pattern::{Pattern, enumerate_patterns};

    #[test]
    fn canonical_hash_delegates_to_closed_form() {
        let hasher = CanonicalHash;
        assert_eq!(hasher.name(), "canonical");
        assert!(hasher.is_canonical());
        assert_eq!(hasher.hash(Pattern::new(0, 2), 4), 4);
        assert_eq!(hasher.hash(Pattern::new(2, 2), 4), 6);
        assert_eq!(hasher.hash(Pattern::new(0, 4), 4), 9);
    }

    #[test]
    fn closures_act_as_hash_functions() {
        let reversed = |pattern: Pattern, n_blocks: usize| {
            let total = n_blocks * (n_blocks + 1) / 2;
            total - 1 - CanonicalHash.hash(pattern, n_blocks)
        };
        assert_eq!(reversed.name(), "custom");
        assert!(!reversed.is_canonical());
        let keys: Vec<usize> = enumerate_patterns(3).map(|p| reversed.hash(p, 3)).collect();
        assert_eq!(keys, vec![5, 4, 3, 2, 1, 0]);
    }
}
