// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::repro::ReproMode;
use std::borrow::Cow;

/// Diagnostics schema version for cost-table build metadata.
pub const DIAGNOSTICS_SCHEMA_VERSION: u32 = 1;

/// Structured diagnostics captured from a cost-table build.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct BuildDiagnostics {
    pub n: usize,
    pub d: usize,
    pub n_blocks: usize,
    pub total_patterns: usize,
    pub cost_evals: usize,
    pub schema_version: u32,
    pub engine_version: Option<String>,
    pub runtime_ms: Option<u64>,
    pub thread_count: Option<usize>,
    pub cost_function: Cow<'static, str>,
    pub hash_function: Cow<'static, str>,
    pub repro_mode: ReproMode,
    pub warnings: Vec<String>,
}

impl Default for BuildDiagnostics {
    fn default() -> Self {
        Self {
            n: 0,
            d: 0,
            n_blocks: 0,
            total_patterns: 0,
            cost_evals: 0,
            schema_version: DIAGNOSTICS_SCHEMA_VERSION,
            engine_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            runtime_ms: None,
            thread_count: None,
            cost_function: Cow::Borrowed(""),
            hash_function: Cow::Borrowed(""),
            repro_mode: ReproMode::Balanced,
            warnings: vec![],
        }
    }
}
