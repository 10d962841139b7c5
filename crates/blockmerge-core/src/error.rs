// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::pattern::Pattern;
use std::fmt;

/// Errors surfaced by block partitioning, table construction and loss evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockMergeError {
    /// Block count is zero, exceeds the series length, or a hash key cannot be stored.
    InvalidConfiguration(String),
    /// Two distinct patterns were assigned the same key during a table build.
    DuplicateKey {
        key: usize,
        first: Pattern,
        second: Pattern,
    },
    /// Loss evaluation produced a key the table does not hold.
    MissingKey {
        key: usize,
        n_blocks: usize,
        table_n_blocks: usize,
    },
    /// Malformed caller input (decision strings, patterns, series views).
    InvalidInput(String),
    /// A cost function returned a non-finite value.
    NumericalIssue(String),
    /// Arithmetic overflow or an exceeded memory budget.
    ResourceLimit(String),
}

impl BlockMergeError {
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn numerical_issue(msg: impl Into<String>) -> Self {
        Self::NumericalIssue(msg.into())
    }

    pub fn resource_limit(msg: impl Into<String>) -> Self {
        Self::ResourceLimit(msg.into())
    }

    pub fn duplicate_key(key: usize, first: Pattern, second: Pattern) -> Self {
        Self::DuplicateKey { key, first, second }
    }

    pub fn missing_key(key: usize, n_blocks: usize, table_n_blocks: usize) -> Self {
        Self::MissingKey {
            key,
            n_blocks,
            table_n_blocks,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "invalid_configuration",
            Self::DuplicateKey { .. } => "duplicate_key",
            Self::MissingKey { .. } => "missing_key",
            Self::InvalidInput(_) => "invalid_input",
            Self::NumericalIssue(_) => "numerical_issue",
            Self::ResourceLimit(_) => "resource_limit",
        }
    }
}

impl fmt::Display for BlockMergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration(msg) => write!(f, "invalid configuration: {msg}"),
            Self::DuplicateKey { key, first, second } => write!(
                f,
                "duplicate pattern key {key}: {first} and {second} hash to the same slot"
            ),
            Self::MissingKey {
                key,
                n_blocks,
                table_n_blocks,
            } if n_blocks != table_n_blocks => write!(
                f,
                "missing pattern key {key}: decisions describe n_blocks={n_blocks}, table was built for n_blocks={table_n_blocks}"
            ),
            Self::MissingKey { key, n_blocks, .. } => write!(
                f,
                "missing pattern key {key}: table for n_blocks={n_blocks} is not keyed by the hash function used for lookup"
            ),
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::NumericalIssue(msg) => write!(f, "numerical issue: {msg}"),
            Self::ResourceLimit(msg) => write!(f, "resource limit: {msg}"),
        }
    }
}

impl std::error::Error for BlockMergeError {}

#[cfg(test)]
mod tests {
    use super::BlockMergeError;
    use crate::pattern::Pattern;

    #[test]
    fn constructors_map_to_matching_variants() {
        assert_eq!(
            BlockMergeError::invalid_configuration("x"),
            BlockMergeError::InvalidConfiguration("x".to_string())
        );
        assert_eq!(
            BlockMergeError::invalid_input("y"),
            BlockMergeError::InvalidInput("y".to_string())
        );
        assert_eq!(
            BlockMergeError::numerical_issue("z"),
            BlockMergeError::NumericalIssue("z".to_string())
        );
        assert_eq!(
            BlockMergeError::resource_limit("w"),
            BlockMergeError::ResourceLimit("w".to_string())
        );
    }

    #[test]
    fn display_includes_key_and_block_counts() {
        let missing = BlockMergeError::missing_key(12, 4, 5);
        let rendered = missing.to_string();
        assert!(rendered.contains("missing pattern key 12"));
        assert!(rendered.contains("n_blocks=4"));
        assert!(rendered.contains("n_blocks=5"));

        let foreign_keys = BlockMergeError::missing_key(7, 4, 4).to_string();
        assert!(foreign_keys.contains("missing pattern key 7"));
        assert!(foreign_keys.contains("not keyed by the hash function"));

        let duplicate =
            BlockMergeError::duplicate_key(3, Pattern::new(3, 1), Pattern::new(0, 2));
        let rendered = duplicate.to_string();
        assert!(rendered.contains("duplicate pattern key 3"));
        assert!(rendered.contains("(position=3, length=1)"));
        assert!(rendered.contains("(position=0, length=2)"));
    }

    #[test]
    fn codes_are_stable() {
        let cases = [
            (BlockMergeError::invalid_configuration(""), "invalid_configuration"),
            (
                BlockMergeError::duplicate_key(0, Pattern::new(0, 1), Pattern::new(0, 1)),
                "duplicate_key",
            ),
            (BlockMergeError::missing_key(0, 1, 1), "missing_key"),
            (BlockMergeError::invalid_input(""), "invalid_input"),
            (BlockMergeError::numerical_issue(""), "numerical_issue"),
            (BlockMergeError::resource_limit(""), "resource_limit"),
        ];
        for (err, code) in cases {
            assert_eq!(err.code(), code);
        }
    }
}
