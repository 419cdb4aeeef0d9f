use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;

use crate::dataset::Dataset;
use crate::error::{CorrError, Result};
use crate::pearson::pearson_pair;

/// One computed coefficient, self-describing by its coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    pub value: f64,
}

/// Square correlation matrix stored as one contiguous row-major buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    data: Array2<f64>,
}

impl CorrelationMatrix {
    /// Matrix of the given dimension with every cell NaN.
    pub fn new(dim: usize) -> Self {
        Self {
            data: Array2::from_elem((dim, dim), f64::NAN),
        }
    }

    /// Rebuilds a matrix from row-major values, as carried by a broadcast.
    pub fn from_row_major(dim: usize, values: Vec<f64>) -> Result<Self> {
        let actual = values.len();
        let data = Array2::from_shape_vec((dim, dim), values)
            .map_err(|_| CorrError::dimension_mismatch("matrix cell count", dim * dim, actual))?;
        Ok(Self { data })
    }

    pub fn dim(&self) -> usize {
        self.data.nrows()
    }

    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[[x, y]]
    }

    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        self.data[[x, y]] = value;
    }

    pub fn write(&mut self, cell: Cell) {
        self.data[[cell.x, cell.y]] = cell.value;
    }

    pub fn row(&self, x: usize) -> ArrayView1<'_, f64> {
        self.data.row(x)
    }

    /// Every cell in row-major order.
    pub fn to_row_major(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }

    /// Cell-by-cell equality where NaN matches NaN.
    pub fn same_values(&self, other: &CorrelationMatrix) -> bool {
        self.dim() == other.dim()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(&a, &b)| same_value(a, b))
    }

    pub fn is_symmetric(&self) -> bool {
        let n = self.dim();
        (0..n).all(|i| (i + 1..n).all(|j| same_value(self.data[[i, j]], self.data[[j, i]])))
    }
}

/// Equality that also treats two NaNs as the same value.
pub(crate) fn same_value(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// Single-process build: each unordered pair (diagonal included) is computed
/// once and mirrored.
pub fn correlation_matrix(dataset: &Dataset) -> CorrelationMatrix {
    let n = dataset.variable_count();

    let row_results: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let lhs = dataset.variable(i);
            (i..n)
                .map(|j| pearson_pair(&lhs, &dataset.variable(j)))
                .collect()
        })
        .collect();

    let mut matrix = CorrelationMatrix::new(n);
    for (i, row) in row_results.into_iter().enumerate() {
        for (offset, value) in row.into_iter().enumerate() {
            let j = i + offset;
            matrix.set(i, j, value);
            matrix.set(j, i, value);
        }
    }
    matrix
}
