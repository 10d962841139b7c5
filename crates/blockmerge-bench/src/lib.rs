// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Shared inputs for the blockmerge benchmarks.

pub fn lcg_next(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *state
}

/// Piecewise signal with a level shift every `n / 8` samples.
pub fn step_signal(n: usize) -> Vec<f64> {
    let segment = (n / 8).max(1);
    (0..n)
        .map(|idx| {
            let level = (idx / segment) as f64 * 3.0;
            let x = idx as f64;
            level + x.sin() * 0.1
        })
        .collect()
}

/// `count` pseudo-random decision strings for `n_blocks` blocks.
pub fn random_decisions(n_blocks: usize, count: usize) -> Vec<Vec<u8>> {
    let mut state = 0xfeed_f00d_dead_beef_u64;
    (0..count)
        .map(|_| {
            (1..n_blocks)
                .map(|_| (lcg_next(&mut state) >> 33) as u8 & 1)
                .collect()
        })
        .collect()
}
