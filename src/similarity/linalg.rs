//! Linear-algebra helpers for the similarity basis.
//!
//! Matrices are `nalgebra::DMatrix<f64>`. This module only adds what the
//! basis needs on top: row-slice construction, an eigen-decomposition with
//! eigenvalues in descending order, and slice helpers for projection.
//! For a symmetric positive semi-definite matrix (every covariance matrix
//! built here) the eigenvalues are also its singular values and the
//! eigenvectors are its left singular vectors.
//!
//! # Reference
//! Golub & Van Loan (2013), "Matrix Computations", 4th ed., Ch. 8

use nalgebra::{DMatrix, SymmetricEigen};

/// Builds a `rows.len() × cols` matrix from row slices.
///
/// Short rows are zero-padded; long rows are cut.
pub fn matrix_from_rows<R: AsRef<[f64]>>(rows: &[R], cols: usize) -> DMatrix<f64> {
    DMatrix::from_fn(rows.len(), cols, |i, j| {
        rows[i].as_ref().get(j).copied().unwrap_or(0.0)
    })
}

/// Dot product over the shorter of the two slices.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Euclidean norm.
#[inline]
pub fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// `trace(Bᵗ·B)` of `v` reshaped row-major into a `side × side` block.
///
/// Equals the squared Frobenius norm of the block.
pub fn block_trace(v: &[f64], side: usize) -> f64 {
    debug_assert_eq!(v.len(), side * side);
    let block = DMatrix::from_row_slice(side, side, v);
    (block.transpose() * &block).trace()
}

/// Eigenpairs of a symmetric matrix, largest eigenvalue first.
#[derive(Debug, Clone)]
pub struct SortedEigen {
    /// Eigenvalues in descending order.
    pub values: Vec<f64>,
    /// Eigenvectors as columns, matching `values`.
    pub vectors: DMatrix<f64>,
}

/// Eigen-decomposition of a symmetric matrix, sorted by eigenvalue.
///
/// # Panics
/// Panics if `m` is not square.
pub fn sorted_eigen(m: DMatrix<f64>) -> SortedEigen {
    let n = m.nrows();
    let eigen = SymmetricEigen::new(m);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| eigen.eigenvalues[j].total_cmp(&eigen.eigenvalues[i]));

    let values = order.iter().map(|&i| eigen.eigenvalues[i]).collect();
    let vectors = DMatrix::from_fn(n, n, |r, c| eigen.eigenvectors[(r, order[c])]);

    SortedEigen { values, vectors }
}
