//! Error type, result alias and small numeric helpers shared by all modules.

use ndarray::{ArrayView1, ArrayView2};
use ndarray_linalg::error::LinalgError;
use ndarray_linalg::Norm;
use thiserror::Error;

pub use ndarray_linalg::Scalar;

#[derive(Error, Debug)]
pub enum PowerSpectrumError {
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },
    #[error("Invalid power spectrum shape: n_max and n_species must be positive")]
    InvalidShape,
    #[error("Reconstruction of slice l={l} failed (relative error {rel_error:e})")]
    ReconstructionFailed { l: usize, rel_error: f64 },
    #[error("Compressed slice l={l} contains non-finite values")]
    NonFiniteInput { l: usize },
    #[error("Eigendecomposition does not reproduce the Gram matrix (relative error {rel_error:e})")]
    EigenDecomposition { rel_error: f64 },
    #[error("Lapack Error")]
    LinalgError(#[from] LinalgError),
    #[error("Pivoted QR failed with info {0}")]
    PivotedQRError(i32),
}

pub type Result<T> = std::result::Result<T, PowerSpectrumError>;

impl PowerSpectrumError {
    pub(crate) fn shape_mismatch<E: ToString, F: ToString>(expected: E, actual: F) -> Self {
        PowerSpectrumError::ShapeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

pub trait RelDiff {
    type A: Scalar;

    /// Return the relative Frobenius norm difference of `first` and `second`.
    ///
    /// If `second` is zero the absolute difference is returned.
    fn rel_diff_fro(
        first: ArrayView2<Self::A>,
        second: ArrayView2<Self::A>,
    ) -> <<Self as RelDiff>::A as Scalar>::Real;

    /// Return the relative l2 vector norm difference of `first` and `second`.
    fn rel_diff_l2(
        first: ArrayView1<Self::A>,
        second: ArrayView1<Self::A>,
    ) -> <<Self as RelDiff>::A as Scalar>::Real;
}

macro_rules! rel_diff_impl {
    ($scalar:ty) => {
        impl RelDiff for $scalar {
            type A = $scalar;
            fn rel_diff_fro(
                first: ArrayView2<Self::A>,
                second: ArrayView2<Self::A>,
            ) -> <<Self as RelDiff>::A as Scalar>::Real {
                let diff = first.to_owned() - &second;
                let reference = second.norm_l2();
                if reference == 0.0 {
                    diff.norm_l2()
                } else {
                    diff.norm_l2() / reference
                }
            }

            fn rel_diff_l2(
                first: ArrayView1<Self::A>,
                second: ArrayView1<Self::A>,
            ) -> <<Self as RelDiff>::A as Scalar>::Real {
                let diff = first.to_owned() - &second;
                let reference = second.norm_l2();
                if reference == 0.0 {
                    diff.norm_l2()
                } else {
                    diff.norm_l2() / reference
                }
            }
        }
    };
}

rel_diff_impl!(f32);
rel_diff_impl!(f64);
