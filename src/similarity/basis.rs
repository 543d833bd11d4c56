//! Reduced basis (eigenspace) of the historical record matrix.
//!
//! # Algorithm
//!
//! 1. Encode each record as a 9-wide row
//!    `[day, shift, work_type, worked, repetition_weight, 0, 0, 0, 0]`.
//!    The four trailing zeros pad the row to a 3×3 block.
//! 2. Center the rows on their column means.
//! 3. Decompose the row covariance `C = A·Aᵗ`. Basis vector `i` is `Aᵗ·uᵢ`,
//!    scaled by `1 / trace(Bᵢᵗ·Bᵢ)` where `Bᵢ` is the vector as a 3×3 block.
//! 4. Keep the leading `k` vectors, where `k` is the index of the first
//!    precipitous drop in significance (see [`retained_rank`]).
//!
//! When there are more records than columns the decomposition runs on the
//! 9×9 Gram matrix `Aᵗ·A` instead: it shares the nonzero spectrum of `A·Aᵗ`
//! and `Aᵗ·uᵢ = √λᵢ·vᵢ`, so the basis is the same at a fraction of the cost.
//!
//! # Reference
//! Turk & Pentland (1991), "Eigenfaces for Recognition"

use tracing::{debug, warn};

use nalgebra::DMatrix;

use super::linalg::{block_trace, dot, sorted_eigen};
use crate::config::StaffingConfig;
use crate::error::{Result, StaffingError};
use crate::models::{HistoricalRecord, Query};

/// Encoded row width (a perfect square).
pub const ROW_WIDTH: usize = 9;
/// Side of the square block a row reshapes into.
pub const BLOCK_SIDE: usize = 3;
/// Fewest distinct records the decomposition accepts.
pub const MIN_RECORDS: usize = 2;

/// Basis vectors whose trace falls below this fraction of the largest
/// trace carry no variance and stay zero.
const ZERO_TRACE_RATIO: f64 = 1e-12;

/// Encodes a historical record as a matrix row.
pub fn record_row(record: &HistoricalRecord) -> [f64; ROW_WIDTH] {
    [
        record.work_day as f64,
        record.work_shift as f64,
        record.work_type.as_f64(),
        if record.worked { 1.0 } else { 0.0 },
        record.repetition_weight,
        0.0,
        0.0,
        0.0,
        0.0,
    ]
}

/// Encodes a query as a matrix row with the given repetition weight.
pub fn query_row(query: &Query, query_weight: f64) -> [f64; ROW_WIDTH] {
    [
        query.work_day as f64,
        query.work_shift as f64,
        query.work_type.as_f64(),
        if query.worked { 1.0 } else { 0.0 },
        query_weight,
        0.0,
        0.0,
        0.0,
        0.0,
    ]
}

/// Subtracts the column means from every row.
///
/// Returns the centered matrix and the mean row.
pub fn center(matrix: &DMatrix<f64>) -> (DMatrix<f64>, Vec<f64>) {
    let (rows, cols) = matrix.shape();
    if rows == 0 {
        return (matrix.clone(), vec![0.0; cols]);
    }

    let means: Vec<f64> = matrix.column_iter().map(|c| c.mean()).collect();
    let centered = DMatrix::from_fn(rows, cols, |i, j| matrix[(i, j)] - means[j]);
    (centered, means)
}

/// Number of significant values in a descending significance list.
///
/// Cuts at the first index `i ≥ 1` where `values[i] × drop_factor` falls
/// below a positive `values[i - 1]`, keeping the `i` values before it.
/// The result is bounded to `[k_min, k_max]` and never exceeds
/// `values.len()`.
pub fn retained_rank(values: &[f64], drop_factor: f64, k_min: usize, k_max: usize) -> usize {
    let mut k = values.len();
    for i in 1..values.len() {
        let prev = values[i - 1];
        if prev > 0.0 && values[i] * drop_factor < prev {
            k = i;
            break;
        }
    }
    k.max(k_min).min(k_max).min(values.len())
}

/// Which covariance form the decomposition runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CovarianceForm {
    /// `A·Aᵗ` (records × records).
    Rows,
    /// `Aᵗ·A` (columns × columns).
    Columns,
}

impl CovarianceForm {
    /// The smaller of the two forms for a matrix shape.
    pub fn for_shape(rows: usize, cols: usize) -> Self {
        if rows > cols {
            Self::Columns
        } else {
            Self::Rows
        }
    }
}

/// Retained basis vectors and their significance values.
#[derive(Debug, Clone)]
pub struct ReducedBasis {
    vectors: Vec<[f64; ROW_WIDTH]>,
    significance: Vec<f64>,
}

impl ReducedBasis {
    /// Builds the basis from encoded record rows, picking the cheaper
    /// covariance form.
    pub fn build(rows: &DMatrix<f64>, config: &StaffingConfig) -> Result<Self> {
        Self::build_with(
            rows,
            config,
            CovarianceForm::for_shape(rows.nrows(), rows.ncols()),
        )
    }

    /// Builds the basis with an explicit covariance form.
    pub fn build_with(
        rows: &DMatrix<f64>,
        config: &StaffingConfig,
        form: CovarianceForm,
    ) -> Result<Self> {
        if rows.nrows() < MIN_RECORDS {
            return Err(StaffingError::InsufficientData {
                required: MIN_RECORDS,
                found: rows.nrows(),
            });
        }
        debug_assert_eq!(rows.ncols(), ROW_WIDTH);

        let (centered, _means) = center(rows);
        let (mut vectors, mut significance) = match form {
            CovarianceForm::Rows => decompose_rows(&centered),
            CovarianceForm::Columns => decompose_columns(&centered),
        };

        normalize(&mut vectors);

        if significance.first().map_or(true, |&s| s <= 0.0) {
            warn!(
                records = rows.nrows(),
                "historical records have no variance; all similarity scores will be zero"
            );
        }

        let k = retained_rank(&significance, config.drop_factor, config.k_min, config.k_max);
        vectors.truncate(k);
        significance.truncate(k);
        debug!(rank = k, ?form, "reduced basis built");

        Ok(Self {
            vectors,
            significance,
        })
    }

    /// Retained rank `k`.
    pub fn rank(&self) -> usize {
        self.vectors.len()
    }

    /// Retained basis vectors.
    pub fn vectors(&self) -> &[[f64; ROW_WIDTH]] {
        &self.vectors
    }

    /// Significance values of the retained vectors (descending).
    pub fn significance(&self) -> &[f64] {
        &self.significance
    }

    /// Projects a row onto every retained vector.
    pub fn project(&self, row: &[f64]) -> Vec<f64> {
        self.vectors.iter().map(|b| dot(row, b)).collect()
    }
}

fn to_row(v: &[f64]) -> [f64; ROW_WIDTH] {
    let mut row = [0.0; ROW_WIDTH];
    for (dst, &src) in row.iter_mut().zip(v) {
        *dst = src;
    }
    row
}

/// `A·Aᵗ` route: one candidate vector per record.
fn decompose_rows(a: &DMatrix<f64>) -> (Vec<[f64; ROW_WIDTH]>, Vec<f64>) {
    let at = a.transpose();
    let eigen = sorted_eigen(a * &at);

    let vectors = (0..a.nrows())
        .map(|i| to_row((&at * eigen.vectors.column(i)).as_slice()))
        .collect();
    let significance = eigen.values.iter().map(|&v| v.max(0.0)).collect();
    (vectors, significance)
}

/// `Aᵗ·A` route, padded to one candidate vector per record.
fn decompose_columns(a: &DMatrix<f64>) -> (Vec<[f64; ROW_WIDTH]>, Vec<f64>) {
    let eigen = sorted_eigen(a.transpose() * a);

    let mut vectors = Vec::with_capacity(a.nrows());
    let mut significance = Vec::with_capacity(a.nrows());
    for (i, &value) in eigen.values.iter().enumerate() {
        let lambda = value.max(0.0);
        let scale = lambda.sqrt();
        let v: Vec<f64> = eigen.vectors.column(i).iter().map(|x| x * scale).collect();
        vectors.push(to_row(&v));
        significance.push(lambda);
    }
    vectors.resize(a.nrows(), [0.0; ROW_WIDTH]);
    significance.resize(a.nrows(), 0.0);
    (vectors, significance)
}

/// Divides each vector by the trace of its 3×3 block; zero-variance
/// vectors become exactly zero.
fn normalize(vectors: &mut [[f64; ROW_WIDTH]]) {
    let traces: Vec<f64> = vectors.iter().map(|v| block_trace(v, BLOCK_SIDE)).collect();
    let largest = traces.iter().copied().fold(0.0, f64::max);

    for (v, &trace) in vectors.iter_mut().zip(&traces) {
        if trace <= 0.0 || trace <= largest * ZERO_TRACE_RATIO {
            *v = [0.0; ROW_WIDTH];
        } else {
            for x in v.iter_mut() {
                *x /= trace;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkType;
    use crate::similarity::linalg::matrix_from_rows;

    fn sample_rows() -> DMatrix<f64> {
        matrix_from_rows(
            &[
                [1.0, 1.0, 0.0, 1.0, 0.01, 0.0, 0.0, 0.0, 0.0],
                [2.0, 1.0, 1.0, 1.0, 0.02, 0.0, 0.0, 0.0, 0.0],
                [3.0, 2.0, 0.0, 0.0, 0.01, 0.0, 0.0, 0.0, 0.0],
                [5.0, 3.0, 2.0, 1.0, 0.03, 0.0, 0.0, 0.0, 0.0],
            ],
            ROW_WIDTH,
        )
    }

    #[test]
    fn test_center() {
        let m = matrix_from_rows(&[[1.0, 10.0], [3.0, 20.0]], 2);
        let (c, means) = center(&m);
        assert!((means[0] - 2.0).abs() < 1e-10);
        assert!((means[1] - 15.0).abs() < 1e-10);
        assert!((c[(0, 0)] + 1.0).abs() < 1e-10);
        assert!((c[(1, 1)] - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_retained_rank_cut() {
        // Drop between 5.0 and 0.01 (0.01 × 100 < 5).
        assert_eq!(retained_rank(&[10.0, 5.0, 0.01, 0.0], 100.0, 1, 1024), 2);
        // No drop anywhere: keep everything.
        assert_eq!(retained_rank(&[10.0, 5.0, 1.0], 100.0, 1, 1024), 3);
    }

    #[test]
    fn test_retained_rank_bounds() {
        assert_eq!(retained_rank(&[10.0, 0.0, 0.0], 100.0, 2, 1024), 2);
        assert_eq!(retained_rank(&[10.0, 9.0, 8.0, 7.0], 100.0, 1, 2), 2);
        assert_eq!(retained_rank(&[10.0], 100.0, 3, 1024), 1);
        assert_eq!(retained_rank(&[], 100.0, 1, 1024), 0);
    }

    #[test]
    fn test_retained_rank_cuts_right_after_first_value() {
        // The first index is eligible, so a dominant leading value stands alone.
        assert_eq!(retained_rank(&[100.0, 0.1, 0.05], 100.0, 1, 1024), 1);
        assert_eq!(retained_rank(&[100.0, 0.1, 0.05], 100.0, 2, 1024), 2);
    }

    #[test]
    fn test_retained_rank_zero_spectrum() {
        assert_eq!(retained_rank(&[0.0, 0.0, 0.0], 100.0, 1, 1024), 3);
    }

    #[test]
    fn test_insufficient_rows() {
        let m = matrix_from_rows(&[[1.0; ROW_WIDTH]], ROW_WIDTH);
        let err = ReducedBasis::build(&m, &StaffingConfig::default()).unwrap_err();
        assert_eq!(
            err,
            StaffingError::InsufficientData {
                required: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_basis_vectors_normalized() {
        let basis = ReducedBasis::build(&sample_rows(), &StaffingConfig::default()).unwrap();
        assert!(basis.rank() >= 1);
        assert_eq!(basis.rank(), basis.significance().len());
        for v in basis.vectors() {
            // After dividing by trace t, the block trace is 1/t; nonzero and finite.
            let t = block_trace(v, BLOCK_SIDE);
            assert!(t.is_finite());
            assert!(t > 0.0);
        }
        for w in basis.significance().windows(2) {
            assert!(w[0] >= w[1]);
        }
    }

    #[test]
    fn test_forms_agree() {
        let config = StaffingConfig::default();
        let rows = sample_rows();
        let a = ReducedBasis::build_with(&rows, &config, CovarianceForm::Rows).unwrap();
        let b = ReducedBasis::build_with(&rows, &config, CovarianceForm::Columns).unwrap();
        assert_eq!(a.rank(), b.rank());
        for (x, y) in a.significance().iter().zip(b.significance()) {
            assert!((x - y).abs() < 1e-8 * x.max(1.0));
        }
        // Vectors agree up to sign.
        for (u, v) in a.vectors().iter().zip(b.vectors()) {
            let same = u.iter().zip(v).all(|(x, y)| (x - y).abs() < 1e-6);
            let flipped = u.iter().zip(v).all(|(x, y)| (x + y).abs() < 1e-6);
            assert!(same || flipped);
        }
    }

    #[test]
    fn test_zero_variance_basis() {
        let row = [1.0, 1.0, 0.0, 1.0, 0.01, 0.0, 0.0, 0.0, 0.0];
        let rows = matrix_from_rows(&[row, row], ROW_WIDTH);
        let basis = ReducedBasis::build(&rows, &StaffingConfig::default()).unwrap();
        for v in basis.vectors() {
            assert!(v.iter().all(|&x| x == 0.0));
        }
    }

    #[test]
    fn test_row_encoding() {
        let q = Query::new(4, 2, WorkType(1));
        let row = query_row(&q, 1.0);
        assert_eq!(row, [4.0, 2.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    }
}
