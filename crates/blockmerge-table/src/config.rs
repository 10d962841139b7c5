// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use blockmerge_core::{BlockMergeError, ReproMode};

/// Configuration for [`crate::CostTableBuilder`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CostTableConfig {
    pub repro_mode: ReproMode,
    /// Evaluate costs on the rayon pool when the `rayon` feature is enabled.
    /// Ignored under [`ReproMode::Strict`].
    pub parallel: bool,
    /// Store non-finite costs instead of failing with `NumericalIssue`.
    pub allow_non_finite: bool,
    /// Upper bound on the bytes held by the finished table.
    pub memory_budget_bytes: Option<usize>,
}

impl Default for CostTableConfig {
    fn default() -> Self {
        Self {
            repro_mode: ReproMode::Balanced,
            parallel: true,
            allow_non_finite: false,
            memory_budget_bytes: None,
        }
    }
}

impl CostTableConfig {
    pub(crate) fn validate(&self) -> Result<(), BlockMergeError> {
        if self.memory_budget_bytes == Some(0) {
            return Err(BlockMergeError::invalid_configuration(
                "memory_budget_bytes must be >= 1 when set; got 0",
            ));
        }
        Ok(())
    }

    #[cfg(feature = "rayon")]
    pub(crate) fn use_parallel(&self) -> bool {
        self.parallel && self.repro_mode != ReproMode::Strict
    }

    #[cfg(not(feature = "rayon"))]
    pub(crate) fn use_parallel(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::CostTableConfig;
    use blockmerge_core::{BlockMergeError, ReproMode};

    #[test]
    fn default_config_is_valid() {
        let config = CostTableConfig::default();
        config.validate().expect("default config should validate");
        assert_eq!(config.repro_mode, ReproMode::Balanced);
        assert!(!config.allow_non_finite);
        assert!(config.memory_budget_bytes.is_none());
    }

    #[test]
    fn zero_memory_budget_is_rejected() {
        let config = CostTableConfig {
            memory_budget_bytes: Some(0),
            ..CostTableConfig::default()
        };
        let err = config.validate().expect_err("zero budget must fail");
        assert!(matches!(err, BlockMergeError::InvalidConfiguration(_)));
    }

    #[test]
    fn strict_mode_never_runs_in_parallel() {
        let config = CostTableConfig {
            repro_mode: ReproMode::Strict,
            parallel: true,
            ..CostTableConfig::default()
        };
        assert!(!config.use_parallel());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_serde_roundtrip() {
        let config = CostTableConfig {
            repro_mode: ReproMode::Fast,
            parallel: false,
            allow_non_finite: true,
            memory_budget_bytes: Some(1 << 20),
        };
        let encoded = serde_json::to_string(&config).expect("config should serialize");
        let decoded: CostTableConfig =
            serde_json::from_str(&encoded).expect("config should deserialize");
        assert_eq!(decoded, config);
    }
}
