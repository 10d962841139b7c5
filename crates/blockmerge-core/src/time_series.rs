// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::BlockMergeError;

/// Borrowed numeric data view over either f32 or f64 values.
#[derive(Clone, Copy, Debug)]
pub enum DTypeView<'a> {
    F32(&'a [f32]),
    F64(&'a [f64]),
}

impl DTypeView<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::F32(slice) => slice.len(),
            Self::F64(slice) => slice.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, idx: usize) -> Option<f64> {
        match self {
            Self::F32(slice) => slice.get(idx).map(|v| f64::from(*v)),
            Self::F64(slice) => slice.get(idx).copied(),
        }
    }
}

/// Memory layout of the `n x d` buffer.
///
/// `CContiguous` stores each time step's `d` values together (`t * d + dim`);
/// `FContiguous` stores each dimension's `n` samples together (`dim * n + t`),
/// which is the layout of a `(d, n)` row-major array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryLayout {
    CContiguous,
    FContiguous,
}

/// Zero-copy time-series view: `n` samples of `d` dimensions.
#[derive(Clone, Copy, Debug)]
pub struct TimeSeriesView<'a> {
    pub values: DTypeView<'a>,
    pub n: usize,
    pub d: usize,
    pub layout: MemoryLayout,
}

impl<'a> TimeSeriesView<'a> {
    /// Constructs a validated `TimeSeriesView`.
    pub fn new(
        values: DTypeView<'a>,
        n: usize,
        d: usize,
        layout: MemoryLayout,
    ) -> Result<Self, BlockMergeError> {
        if n == 0 {
            return Err(BlockMergeError::invalid_input("n must be >= 1"));
        }
        if d == 0 {
            return Err(BlockMergeError::invalid_input("d must be >= 1"));
        }

        let expected_len = n
            .checked_mul(d)
            .ok_or_else(|| BlockMergeError::invalid_input("n*d overflow while validating shape"))?;

        let value_len = values.len();
        if value_len != expected_len {
            return Err(BlockMergeError::invalid_input(format!(
                "value length mismatch: got {value_len}, expected {expected_len} (n={n}, d={d})"
            )));
        }

        Ok(Self {
            values,
            n,
            d,
            layout,
        })
    }

    pub fn from_f32(
        values: &'a [f32],
        n: usize,
        d: usize,
        layout: MemoryLayout,
    ) -> Result<Self, BlockMergeError> {
        Self::new(DTypeView::F32(values), n, d, layout)
    }

    pub fn from_f64(
        values: &'a [f64],
        n: usize,
        d: usize,
        layout: MemoryLayout,
    ) -> Result<Self, BlockMergeError> {
        Self::new(DTypeView::F64(values), n, d, layout)
    }

    /// Univariate f64 series.
    pub fn univariate(values: &'a [f64]) -> Result<Self, BlockMergeError> {
        Self::from_f64(values, values.len(), 1, MemoryLayout::CContiguous)
    }

    pub fn is_univariate(&self) -> bool {
        self.d == 1
    }

    /// Reads sample `t` of dimension `dim` as f64.
    pub fn value(&self, t: usize, dim: usize) -> Result<f64, BlockMergeError> {
        if t >= self.n || dim >= self.d {
            return Err(BlockMergeError::invalid_input(format!(
                "sample index out of bounds: t={t}, dim={dim}, n={}, d={}",
                self.n, self.d
            )));
        }
        let idx = match self.layout {
            MemoryLayout::CContiguous => t * self.d + dim,
            MemoryLayout::FContiguous => dim * self.n + t,
        };
        self.values
            .get(idx)
            .ok_or_else(|| BlockMergeError::invalid_input("value index out of bounds"))
    }

    /// Copies one dimension into a contiguous buffer.
    pub fn column(&self, dim: usize) -> Result<Vec<f64>, BlockMergeError> {
        (0..self.n).map(|t| self.value(t, dim)).collect()
    }
}
