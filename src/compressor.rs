//! Projection of l-slices onto the random key.
//!
//! The compressed form of a slice $P_l$ is $W_l^T P_l$, a $(2l+1)\times NS$ matrix.
//! Flattening concatenates the compressed slices row by row in order of $l$.

use crate::projection::ProjectionKey;
use crate::slices::{self, PowerSpectrumShape};
use crate::types::{PowerSpectrumError, Result};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};

/// Compress a single slice of degree `l`.
pub fn compress_slice(slice: ArrayView2<f64>, l: usize, key: &ProjectionKey) -> Result<Array2<f64>> {
    let ns = key.shape().ns();
    if slice.dim() != (ns, ns) {
        return Err(PowerSpectrumError::shape_mismatch(
            format!("{:?}", (ns, ns)),
            format!("{:?}", slice.dim()),
        ));
    }

    Ok(key.columns(l).t().dot(&slice))
}

/// Compress all slices of a power spectrum. Slice `l` of the input is the slice of degree `l`.
pub fn compress(slices: &[Array2<f64>], key: &ProjectionKey) -> Result<Vec<Array2<f64>>> {
    let shape = key.shape();
    if slices.len() != shape.n_slices() {
        return Err(PowerSpectrumError::shape_mismatch(
            format!("{} slices", shape.n_slices()),
            format!("{} slices", slices.len()),
        ));
    }

    slices
        .iter()
        .enumerate()
        .map(|(l, slice)| compress_slice(slice.view(), l, key))
        .collect()
}

/// Concatenate compressed slices into a single vector.
pub fn flatten(compressed: &[Array2<f64>]) -> Array1<f64> {
    compressed
        .iter()
        .flat_map(|slice| slice.iter().cloned())
        .collect()
}

/// Split a flattened compressed vector back into its slices.
pub fn unflatten(vector: ArrayView1<f64>, shape: PowerSpectrumShape) -> Result<Vec<Array2<f64>>> {
    if vector.len() != shape.compressed_len() {
        return Err(PowerSpectrumError::shape_mismatch(
            shape.compressed_len(),
            vector.len(),
        ));
    }

    let ns = shape.ns();
    let mut offset = 0;
    let mut compressed = Vec::with_capacity(shape.n_slices());

    for l in 0..shape.n_slices() {
        let width = shape.slice_width(l);
        let block = vector.slice(s![offset..offset + width * ns]);
        let slice = Array2::from_shape_vec((width, ns), block.to_vec()).map_err(|_| {
            PowerSpectrumError::shape_mismatch(format!("{:?}", (width, ns)), block.len())
        })?;
        compressed.push(slice);
        offset += width * ns;
    }

    Ok(compressed)
}

/// Compress a packed power spectrum into a flat vector of length
/// [`PowerSpectrumShape::compressed_len`].
///
/// If `normalize` is set the raw vector is scaled to unit norm before it is
/// decomposed into slices.
pub fn compress_vector(
    vector: ArrayView1<f64>,
    key: &ProjectionKey,
    normalize: bool,
) -> Result<Array1<f64>> {
    let shape = key.shape();

    let slices = if normalize {
        slices::decompose(slices::normalize(vector).view(), shape)?
    } else {
        slices::decompose(vector, shape)?
    };

    Ok(flatten(&compress(&slices, key)?))
}
