//! Reconstruction of PSD slices from their random projections.
//!
//! Let $P$ be a symmetric positive semi-definite $n\times n$ matrix and $W$ an
//! $n\times k$ projection map. Given only $B = W^TP$ and $W$ we recover $P$ as follows.
//!
//! 1. Select a maximal set of linearly independent rows $T = B_{I,:}$ of $B$.
//! 2. Form $C = BW = W^TPW$ and restrict it to $C_{I,I}$, which is symmetric PSD.
//! 3. Diagonalize $C_{I,I} = U^T\Lambda U$.
//! 4. Set $X = \Lambda^{-1/2}UT$ and return $P = X^TX = T^TC_{I,I}^{-1}T$.
//!
//! The result equals $P$ whenever $\text{rank}(W^TP) = \text{rank}(P)$. If the
//! projection loses rank the algorithm still produces a PSD matrix consistent with
//! $B$, but it is not $P$. This cannot be detected from $B$ alone, see
//! [`crate::verify::check_round_trip`].

use crate::config::CompressionConfig;
use crate::projection::ProjectionKey;
use crate::rank::{independent_rows, IndependentRows};
use crate::types::{PowerSpectrumError, RelDiff, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use ndarray_linalg::{Eigh, UPLO};
use tracing::{debug, warn};

/// Factor applied to the smallest positive inverse square root to obtain the
/// inverse square root used for non-positive eigenvalues.
///
/// The reduced Gram matrix is PSD in exact arithmetic. Eigenvalues that come out
/// zero or negative are rounding artifacts, and their directions get a weight that
/// is negligible against every genuine direction. This is an approximation, not a
/// bound.
pub const EIGENVALUE_CLAMP_FACTOR: f64 = 1E-15;

/// A reconstructed slice together with diagnostics of the reconstruction.
#[derive(Clone, Debug)]
pub struct Reconstruction {
    /// The reconstructed symmetric matrix.
    pub matrix: Array2<f64>,
    /// Angular degree of the slice.
    pub l: usize,
    /// Rows of the compressed slice that were used for the reconstruction.
    pub ind: Vec<usize>,
    /// Number of non-positive eigenvalues that were clamped.
    pub clamped_eigenvalues: usize,
    /// True if the compressed slice was zero and no eigendecomposition was done.
    pub zero_shortcut: bool,
}

impl Reconstruction {
    /// Rank of the reconstructed matrix.
    pub fn rank(&self) -> usize {
        self.ind.len()
    }

    pub fn is_zero_shortcut(&self) -> bool {
        self.zero_shortcut
    }

    pub fn into_matrix(self) -> Array2<f64> {
        self.matrix
    }
}

/// Inverse square roots of `eigvals` with non-positive eigenvalues clamped.
///
/// Returns the roots and the number of clamped eigenvalues. A non-positive
/// eigenvalue gets `EIGENVALUE_CLAMP_FACTOR` times the smallest inverse square
/// root of the positive eigenvalues, or zero if there is none.
pub fn inverse_sqrt_clamped(eigvals: ArrayView1<f64>) -> (Array1<f64>, usize) {
    let min_root = eigvals
        .iter()
        .filter(|&&item| item > 0.0)
        .map(|&item| 1.0 / item.sqrt())
        .fold(None, |acc: Option<f64>, root| {
            Some(acc.map_or(root, |current| current.min(root)))
        });

    let clamp_value = min_root.unwrap_or(0.0) * EIGENVALUE_CLAMP_FACTOR;
    let mut clamped = 0;

    let roots = eigvals.mapv(|item| {
        if item > 0.0 {
            1.0 / item.sqrt()
        } else {
            clamped += 1;
            clamp_value
        }
    });

    (roots, clamped)
}

/// Reconstruct a slice of degree `l` from `wtp` $= W^TP$ and the projection map `w`.
///
/// `w` has shape (n, k) and `wtp` shape (k, n).
pub fn reconstruct(
    wtp: ArrayView2<f64>,
    w: ArrayView2<f64>,
    l: usize,
    config: &CompressionConfig,
) -> Result<Reconstruction> {
    let n = w.nrows();
    let k = w.ncols();

    if wtp.dim() != (k, n) {
        return Err(PowerSpectrumError::shape_mismatch(
            format!("{:?}", (k, n)),
            format!("{:?}", wtp.dim()),
        ));
    }

    if wtp.iter().any(|item| !item.is_finite()) {
        return Err(PowerSpectrumError::NonFiniteInput { l });
    }

    let max_abs = wtp.iter().fold(0.0, |acc: f64, &item| acc.max(item.abs()));
    if max_abs <= config.zero_tolerance {
        debug!(l, "compressed slice is zero, skipping reconstruction");
        return Ok(Reconstruction {
            matrix: Array2::zeros((n, n)),
            l,
            ind: Vec::new(),
            clamped_eigenvalues: 0,
            zero_shortcut: true,
        });
    }

    let rows = independent_rows(wtp, config.rank_tolerance, config.rank_estimator)?;
    reconstruct_from_rows(wtp, w, l, rows, config)
}

/// Steps 3 to 6 of the reconstruction for an already selected row set of `wtp`.
fn reconstruct_from_rows(
    wtp: ArrayView2<f64>,
    w: ArrayView2<f64>,
    l: usize,
    rows: IndependentRows,
    config: &CompressionConfig,
) -> Result<Reconstruction> {
    let gram = wtp.dot(&w);
    let gram_red = gram.select(Axis(0), &rows.ind).select(Axis(1), &rows.ind);

    // gram_red = V diag(eigvals) V^T, so U = V^T.
    let (eigvals, eigvecs) = gram_red.eigh(UPLO::Lower)?;
    let u = eigvecs.t();

    let restored = u.t().dot(&Array2::from_diag(&eigvals)).dot(&u);
    let rel_error = f64::rel_diff_fro(restored.view(), gram_red.view());
    if rel_error > config.eigen_tolerance {
        return Err(PowerSpectrumError::EigenDecomposition { rel_error });
    }

    let (roots, clamped_eigenvalues) = inverse_sqrt_clamped(eigvals.view());
    if clamped_eigenvalues > 0 {
        warn!(
            l,
            clamped = clamped_eigenvalues,
            rank = rows.rank(),
            "non-positive eigenvalues in reduced Gram matrix, projection key may be poorly conditioned"
        );
    }

    let x = Array2::from_diag(&roots).dot(&u.dot(&rows.rows));
    let p = x.t().dot(&x);
    let matrix = (&p + &p.t()).mapv(|item| 0.5 * item);

    let rel_error = f64::rel_diff_fro(w.t().dot(&matrix).view(), wtp);
    if rel_error > config.verification_tolerance {
        warn!(l, rel_error, "reprojected reconstruction does not match compressed slice");
        return Err(PowerSpectrumError::ReconstructionFailed { l, rel_error });
    }

    Ok(Reconstruction {
        matrix,
        l,
        ind: rows.ind,
        clamped_eigenvalues,
        zero_shortcut: false,
    })
}

/// Decompress the compressed slice of degree `l` with the columns of `key` for `l`.
pub fn decompress(
    wtp: ArrayView2<f64>,
    l: usize,
    key: &ProjectionKey,
    config: &CompressionConfig,
) -> Result<Reconstruction> {
    reconstruct(wtp, key.columns(l), l, config)
}

/// Decompress all slices of a power spectrum. Entry `l` of `compressed` is the slice of degree `l`.
pub fn decompress_all(
    compressed: &[Array2<f64>],
    key: &ProjectionKey,
    config: &CompressionConfig,
) -> Result<Vec<Reconstruction>> {
    let shape = key.shape();
    if compressed.len() != shape.n_slices() {
        return Err(PowerSpectrumError::shape_mismatch(
            format!("{} slices", shape.n_slices()),
            format!("{} slices", compressed.len()),
        ));
    }

    compressed
        .iter()
        .enumerate()
        .map(|(l, wtp)| decompress(wtp.view(), l, key, config))
        .collect()
}
