// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Reproducibility mode used to control determinism/performance trade-offs.
///
/// `Strict` selects compensated summation and keeps table builds on the
/// calling thread.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReproMode {
    Strict,
    #[default]
    Balanced,
    Fast,
}

/// Prefix sums with a leading zero: `out[i] = values[0] + ... + values[i-1]`.
pub fn prefix_sums(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len() + 1);
    let mut acc = 0.0;
    out.push(acc);
    for &value in values {
        acc += value;
        out.push(acc);
    }
    out
}

/// Prefix sums of squares with a leading zero.
pub fn prefix_sum_squares(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len() + 1);
    let mut acc = 0.0;
    out.push(acc);
    for &value in values {
        acc += value * value;
        out.push(acc);
    }
    out
}

#[derive(Clone, Copy, Debug, Default)]
struct KahanSum {
    sum: f64,
    compensation: f64,
}

impl KahanSum {
    fn add(&mut self, value: f64) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }
}

/// Compensated variant of [`prefix_sums`].
pub fn prefix_sums_kahan(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len() + 1);
    let mut acc = KahanSum::default();
    out.push(0.0);
    for &value in values {
        acc.add(value);
        out.push(acc.sum);
    }
    out
}

/// Compensated variant of [`prefix_sum_squares`].
pub fn prefix_sum_squares_kahan(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len() + 1);
    let mut acc = KahanSum::default();
    out.push(0.0);
    for &value in values {
        acc.add(value * value);
        out.push(acc.sum);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{
        ReproMode, prefix_sum_squares, prefix_sum_squares_kahan, prefix_sums, prefix_sums_kahan,
    };

    #[test]
    fn repro_mode_default_is_balanced() {
        assert_eq!(ReproMode::default(), ReproMode::Balanced);
    }

    #[test]
    fn prefix_sums_have_leading_zero() {
        assert_eq!(prefix_sums(&[1.0, 2.0, 3.0]), vec![0.0, 1.0, 3.0, 6.0]);
        assert_eq!(prefix_sum_squares(&[1.0, 2.0, 3.0]), vec![0.0, 1.0, 5.0, 14.0]);
        assert_eq!(prefix_sums(&[]), vec![0.0]);
    }

    #[test]
    fn kahan_prefix_sums_recover_small_increments() {
        let mut values = vec![1.0e16];
        values.extend(std::iter::repeat_n(1.0, 1_000));
        values.push(-1.0e16);

        let naive = prefix_sums(&values);
        let compensated = prefix_sums_kahan(&values);
        assert_eq!(compensated.last().copied(), Some(1_000.0));
        assert_ne!(naive.last().copied(), Some(1_000.0));

        let squares = prefix_sum_squares_kahan(&[0.5, 0.5, 0.5]);
        assert_eq!(squares, vec![0.0, 0.25, 0.5, 0.75]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn repro_mode_serde_roundtrip() {
        for mode in [ReproMode::Strict, ReproMode::Balanced, ReproMode::Fast] {
            let encoded = serde_json::to_string(&mode).expect("repro mode should serialize");
            let decoded: ReproMode =
                serde_json::from_str(&encoded).expect("repro mode should deserialize");
            assert_eq!(decoded, mode);
        }
    }
}
