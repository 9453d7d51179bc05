//! Numerical rank and extraction of linearly independent rows.
//!
//! The rank of a matrix $A$ is the number of singular values
//! $\sigma_i > \tau$ for an absolute threshold $\tau$. Thresholds are derived
//! from a relative tolerance and the scale of the matrix, which is its largest
//! singular value (or, for the pivoted QR back-end, $|r_{11}|$).

use crate::pivoted_qr::PivotedQR;
use crate::types::Result;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use ndarray_linalg::SVD;
use tracing::debug;

/// Back-end for rank decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankEstimator {
    /// Singular values from an SVD.
    SVD,
    /// Diagonal of R from a QR decomposition with column pivoting.
    QRCP,
}

impl Default for RankEstimator {
    fn default() -> Self {
        RankEstimator::SVD
    }
}

impl RankEstimator {
    /// Return the rank revealing values of `mat` in non-increasing order.
    pub fn magnitudes(&self, mat: ArrayView2<f64>) -> Result<Array1<f64>> {
        if mat.is_empty() {
            return Ok(Array1::zeros(0));
        }

        match self {
            RankEstimator::SVD => {
                let (_, s, _) = mat.svd(false, false)?;
                Ok(s)
            }
            RankEstimator::QRCP => mat.pivoted_r_diag(),
        }
    }

    /// The scale against which relative tolerances are measured.
    pub fn scale(&self, mat: ArrayView2<f64>) -> Result<f64> {
        let magnitudes = self.magnitudes(mat)?;
        Ok(magnitudes.iter().cloned().fold(0.0, f64::max))
    }

    /// Number of rank revealing values strictly above `threshold`.
    pub fn rank_with_threshold(&self, mat: ArrayView2<f64>, threshold: f64) -> Result<usize> {
        let magnitudes = self.magnitudes(mat)?;
        Ok(magnitudes.iter().filter(|&&item| item > threshold).count())
    }

    /// Numerical rank of `mat` relative to its own scale.
    pub fn numerical_rank(&self, mat: ArrayView2<f64>, rel_tol: f64) -> Result<usize> {
        let threshold = rel_tol * self.scale(mat)?;
        self.rank_with_threshold(mat, threshold)
    }
}

/// Rows of a matrix that are linearly independent of all rows before them.
pub struct IndependentRows {
    /// The retained rows, in their original order.
    pub rows: Array2<f64>,
    /// Indices of the retained rows in the original matrix.
    pub ind: Vec<usize>,
}

impl IndependentRows {
    pub fn rank(&self) -> usize {
        self.ind.len()
    }
}

/// Greedily select independent rows of `mat`.
///
/// Rows are scanned in order and a row is kept if it increases the numerical rank
/// of the rows kept so far. The threshold is fixed once from the scale of the whole
/// matrix so that every rank decision is taken on the same footing.
pub fn independent_rows(
    mat: ArrayView2<f64>,
    rel_tol: f64,
    estimator: RankEstimator,
) -> Result<IndependentRows> {
    let threshold = rel_tol * estimator.scale(mat)?;
    let max_rank = mat.nrows().min(mat.ncols());

    let mut ind: Vec<usize> = Vec::with_capacity(max_rank);

    for index in 0..mat.nrows() {
        if ind.len() == max_rank {
            break;
        }

        let mut candidate = ind.clone();
        candidate.push(index);

        let rank = estimator.rank_with_threshold(mat.select(Axis(0), &candidate).view(), threshold)?;
        if rank > ind.len() {
            ind = candidate;
        }
    }

    debug!(
        rows = mat.nrows(),
        rank = ind.len(),
        "extracted independent rows"
    );

    Ok(IndependentRows {
        rows: mat.select(Axis(0), &ind),
        ind,
    })
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::random_matrix::RandomMatrix;
    use ndarray::{arr2, s, Array2};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    macro_rules! rank_tests {
        ($($name:ident: $estimator:expr, $dim:expr, $rank:expr,)*) => {
            $(
            #[test]
            fn $name() {
                let mut rng = StdRng::seed_from_u64(21);
                let left = f64::random_gaussian(($dim.0, $rank), &mut rng);
                let right = f64::random_gaussian(($rank, $dim.1), &mut rng);
                let mat = left.dot(&right);

                assert_eq!($estimator.numerical_rank(mat.view(), 1E-10).unwrap(), $rank);
            }
            )*
        };
    }

    rank_tests! {
        test_svd_rank_thin: RankEstimator::SVD, (20, 8), 3,
        test_svd_rank_thick: RankEstimator::SVD, (8, 20), 5,
        test_qrcp_rank_thin: RankEstimator::QRCP, (20, 8), 3,
        test_qrcp_rank_thick: RankEstimator::QRCP, (8, 20), 5,
    }

    #[test]
    fn test_zero_matrix_has_rank_zero() {
        let mat = Array2::<f64>::zeros((3, 4));
        assert_eq!(RankEstimator::SVD.numerical_rank(mat.view(), 1E-10).unwrap(), 0);
        assert_eq!(RankEstimator::QRCP.numerical_rank(mat.view(), 1E-10).unwrap(), 0);
    }

    #[test]
    fn test_independent_rows_skips_dependent_rows() {
        // Row 1 is twice row 0, row 3 is row 0 + row 2.
        let mat = arr2(&[
            [1.0, 2.0, 0.0, 1.0],
            [2.0, 4.0, 0.0, 2.0],
            [0.0, 1.0, 1.0, 0.0],
            [1.0, 3.0, 1.0, 1.0],
            [0.0, 0.0, 0.0, 5.0],
        ]);

        for &estimator in &[RankEstimator::SVD, RankEstimator::QRCP] {
            let result = independent_rows(mat.view(), 1E-10, estimator).unwrap();
            assert_eq!(result.ind, vec![0, 2, 4]);
            assert_eq!(result.rank(), 3);
            assert_eq!(result.rows.row(1), mat.row(2));
        }
    }

    #[test]
    fn test_independent_rows_of_full_rank_matrix() {
        let mut rng = StdRng::seed_from_u64(5);
        let mat = f64::random_gaussian((6, 4), &mut rng);
        let result = independent_rows(mat.view(), 1E-10, RankEstimator::SVD).unwrap();

        assert_eq!(result.ind, vec![0, 1, 2, 3]);
        assert_eq!(result.rows, mat.slice(s![0..4, ..]));
    }
}
