use std::ops::Range;

use sprs::{CsMat, TriMat};

use crate::error::{FeatureError, Result};

/// ContactMatrix
///
/// Square sparse matrix of contacts between the bins of one chromosome in one cell.
/// Stored in compressed sparse row format.  All entries are finite and non-negative,
/// and explicit zeros are not stored.  Duplicate coordinates are summed on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactMatrix {
    mat: CsMat<f64>,
}

impl ContactMatrix {
    /// All zero n x n matrix
    pub fn zeros(n: usize) -> Self {
        Self::from_valid_triplets(n, std::iter::empty())
    }

    /// Build from (row, col, value) triplets, checking that coordinates lie within the
    /// matrix and that values are finite and non-negative
    pub fn from_triplets<I>(n: usize, triplets: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut tri = TriMat::new((n, n));
        for (row, col, x) in triplets {
            check_entry(n, row, col, x)?;
            if x != 0.0 {
                tri.add_triplet(row, col, x)
            }
        }
        Ok(Self { mat: tri.to_csr() })
    }

    /// Build from CSR component arrays (as stored by scipy.sparse).
    /// Column indices within a row need not be sorted
    pub fn from_csr(
        shape: (usize, usize),
        indptr: &[usize],
        indices: &[usize],
        data: &[f64],
    ) -> Result<Self> {
        let (n, cols) = shape;
        if n != cols {
            return Err(FeatureError::NotSquare { rows: n, cols });
        }
        if indptr.len() != n + 1 {
            return Err(FeatureError::DimensionMismatch {
                what: "indptr",
                expected: n + 1,
                found: indptr.len(),
            });
        }
        if indices.len() != data.len() {
            return Err(FeatureError::DimensionMismatch {
                what: "indices",
                expected: data.len(),
                found: indices.len(),
            });
        }
        if indptr[0] != 0 || indptr[n] != data.len() || indptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(FeatureError::InvalidParameter(
                "indptr is not a valid CSR row pointer array".to_owned(),
            ));
        }
        let triplets = indptr.windows(2).enumerate().flat_map(|(row, w)| {
            (w[0]..w[1]).map(move |k| (row, indices[k], data[k]))
        });
        Self::from_triplets(n, triplets)
    }

    /// Build from triplets that are already known to be valid
    pub(crate) fn from_valid_triplets<I>(n: usize, triplets: I) -> Self
    where
        I: Iterator<Item = (usize, usize, f64)>,
    {
        let mut tri = TriMat::new((n, n));
        for (row, col, x) in triplets.filter(|(_, _, x)| *x != 0.0) {
            tri.add_triplet(row, col, x)
        }
        Self { mat: tri.to_csr() }
    }

    /// Number of bins
    pub fn n(&self) -> usize {
        self.mat.rows()
    }

    pub fn nnz(&self) -> usize {
        self.mat.nnz()
    }

    pub fn is_empty(&self) -> bool {
        self.n() == 0
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row < self.n() && col < self.n() {
            self.mat.get(row, col).copied().unwrap_or(0.0)
        } else {
            0.0
        }
    }

    /// Iterate over stored entries as (row, col, value)
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.mat.iter().map(|(x, (row, col))| (row, col, *x))
    }

    pub fn row_sums(&self) -> Vec<f64> {
        self.mat
            .outer_iterator()
            .map(|row| row.iter().map(|(_, x)| *x).sum())
            .collect()
    }

    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.n()).map(|i| self.get(i, i)).collect()
    }

    pub fn total(&self) -> f64 {
        self.mat.data().iter().sum()
    }

    pub fn is_symmetric(&self) -> bool {
        self.iter().all(|(row, col, x)| self.get(col, row) == x)
    }

    /// Sum of the entries in the block rows x cols.  Both ranges are truncated to the
    /// matrix dimensions
    pub fn block_sum(&self, rows: Range<usize>, cols: Range<usize>) -> f64 {
        let n = self.n();
        let cols = cols.start.min(n)..cols.end.min(n);
        if cols.is_empty() {
            return 0.0;
        }
        let mut s = 0.0;
        for row in rows.start.min(n)..rows.end.min(n) {
            if let Some(v) = self.mat.outer_view(row) {
                s += v
                    .iter()
                    .filter(|(col, _)| cols.contains(col))
                    .map(|(_, x)| *x)
                    .sum::<f64>()
            }
        }
        s
    }

    /// Mean of each diagonal k (k = 0..n), taken over all n - k positions of the upper
    /// diagonal, counting zeros
    pub fn diagonal_means(&self) -> Vec<f64> {
        let n = self.n();
        let mut sums = vec![0.0; n];
        for (row, col, x) in self.iter().filter(|(row, col, _)| col >= row) {
            sums[col - row] += x
        }
        sums.iter()
            .enumerate()
            .map(|(k, s)| s / ((n - k) as f64))
            .collect()
    }

    /// Matrix - vector product
    pub fn mul_vec(&self, v: &[f64]) -> Result<Vec<f64>> {
        if v.len() != self.n() {
            return Err(FeatureError::DimensionMismatch {
                what: "vector",
                expected: self.n(),
                found: v.len(),
            });
        }
        Ok(self
            .mat
            .outer_iterator()
            .map(|row| row.iter().map(|(col, x)| x * v[col]).sum())
            .collect())
    }

    /// Multiply every entry by c (c must be finite and non-negative)
    pub fn scale(&self, c: f64) -> Result<Self> {
        let n = self.n();
        Self::from_triplets(n, self.iter().map(|(row, col, x)| (row, col, x * c)))
    }
}

fn check_entry(n: usize, row: usize, col: usize, x: f64) -> Result<()> {
    if row >= n || col >= n {
        Err(FeatureError::InvalidEntry {
            row,
            col,
            message: format!("index out of range for {} x {} matrix", n, n),
        })
    } else if !x.is_finite() || x < 0.0 {
        Err(FeatureError::InvalidEntry {
            row,
            col,
            message: format!("value {} is not a finite non-negative number", x),
        })
    } else {
        Ok(())
    }
}
