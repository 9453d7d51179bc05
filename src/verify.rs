//! Validation helpers comparing reconstructions against the original slices.
//!
//! None of this is needed to compress or decompress. It is the harness used to
//! decide whether a projection key is adequate for a given data set.

use crate::config::CompressionConfig;
use crate::decompressor::{reconstruct, Reconstruction};
use crate::projection::ProjectionKey;
use crate::types::{PowerSpectrumError, RelDiff, Result};
use ndarray::{Array2, ArrayView2, Zip};
use tracing::warn;

/// Element-wise comparison `|a - b| <= tol * (1 + |b|)`.
pub fn allclose(first: ArrayView2<f64>, second: ArrayView2<f64>, tol: f64) -> bool {
    if first.dim() != second.dim() {
        return false;
    }

    Zip::from(first)
        .and(second)
        .fold(true, |acc, &a, &b| acc && (a - b).abs() <= tol * (1.0 + b.abs()))
}

/// Check that all reconstructed slices agree with the original slices.
pub fn verify(original: &[Array2<f64>], reconstructed: &[Array2<f64>], tol: f64) -> bool {
    original.len() == reconstructed.len()
        && original
            .iter()
            .zip(reconstructed.iter())
            .all(|(first, second)| allclose(second.view(), first.view(), tol))
}

/// Compress `slice` with the projection map `w`, decompress it and compare the
/// result with `slice`.
///
/// Fails with [`PowerSpectrumError::ReconstructionFailed`] if the relative
/// Frobenius error exceeds the verification tolerance of `config`.
pub fn check_round_trip_with_map(
    slice: ArrayView2<f64>,
    w: ArrayView2<f64>,
    l: usize,
    config: &CompressionConfig,
) -> Result<Reconstruction> {
    if slice.dim() != (w.nrows(), w.nrows()) {
        return Err(PowerSpectrumError::shape_mismatch(
            format!("{:?}", (w.nrows(), w.nrows())),
            format!("{:?}", slice.dim()),
        ));
    }

    let wtp = w.t().dot(&slice);
    let reconstruction = reconstruct(wtp.view(), w, l, config)?;

    let rel_error = f64::rel_diff_fro(reconstruction.matrix.view(), slice);
    if rel_error > config.verification_tolerance {
        warn!(
            l,
            rel_error,
            rank = reconstruction.rank(),
            "reconstruction does not reproduce the original slice"
        );
        return Err(PowerSpectrumError::ReconstructionFailed { l, rel_error });
    }

    Ok(reconstruction)
}

/// Round trip check of the slice of degree `l` with the columns of `key` for `l`.
pub fn check_round_trip(
    slice: ArrayView2<f64>,
    l: usize,
    key: &ProjectionKey,
    config: &CompressionConfig,
) -> Result<Reconstruction> {
    check_round_trip_with_map(slice, key.columns(l), l, config)
}
