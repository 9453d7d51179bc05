//! Conversion between packed power spectrum vectors and per-l symmetric slices.
//!
//! A power spectrum with $N$ radial functions, $S$ species and maximum angular
//! degree $L$ stores, for every pair $n_1 \geq n_2$ of combined radial/species
//! indices in $\{0, \dots, NS-1\}$, a contiguous run of $L+1$ values, one per
//! angular degree $l$. The pairs are ordered row by row through the lower
//! triangle ($n_1$ outer, $n_2 = 0, \dots, n_1$ inner). Off-diagonal values
//! carry a factor $2^{-1/2}$ with respect to the entry of the symmetric slice
//! $P_l$.

use crate::types::{PowerSpectrumError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use ndarray_linalg::Norm;
use std::f64::consts::{FRAC_1_SQRT_2, SQRT_2};

/// Structural parameters of a power spectrum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerSpectrumShape {
    n_max: usize,
    l_max: usize,
    n_species: usize,
}

impl PowerSpectrumShape {
    /// Create a new shape from the radial basis size `n_max`, the maximum angular
    /// degree `l_max` and the number of species `n_species`.
    pub fn new(n_max: usize, l_max: usize, n_species: usize) -> Result<Self> {
        if n_max == 0 || n_species == 0 {
            return Err(PowerSpectrumError::InvalidShape);
        }

        Ok(PowerSpectrumShape {
            n_max,
            l_max,
            n_species,
        })
    }

    pub fn n_max(&self) -> usize {
        self.n_max
    }

    pub fn l_max(&self) -> usize {
        self.l_max
    }

    pub fn n_species(&self) -> usize {
        self.n_species
    }

    /// Dimension $NS$ of every slice.
    pub fn ns(&self) -> usize {
        self.n_max * self.n_species
    }

    /// Number of slices, $L + 1$.
    pub fn n_slices(&self) -> usize {
        self.l_max + 1
    }

    /// Length of the packed power spectrum, $NS(NS+1)(L+1)/2$.
    pub fn packed_len(&self) -> usize {
        self.ns() * (self.ns() + 1) * self.n_slices() / 2
    }

    /// Number of columns of the projection matrix, $\min(NS, 2L+1)$.
    pub fn projection_width(&self) -> usize {
        self.ns().min(2 * self.l_max + 1)
    }

    /// Number of rows of the compressed slice for degree `l`.
    pub fn slice_width(&self, l: usize) -> usize {
        self.ns().min(2 * l + 1)
    }

    /// Length of the flattened compressed representation.
    ///
    /// Equal to $NS(L+1)^2$ whenever $NS \geq 2L+1$.
    pub fn compressed_len(&self) -> usize {
        self.ns() * (0..self.n_slices()).map(|l| self.slice_width(l)).sum::<usize>()
    }

    /// Ratio of compressed to packed length.
    pub fn compression_ratio(&self) -> f64 {
        self.compressed_len() as f64 / self.packed_len() as f64
    }

    fn check_slices(&self, slices: &[Array2<f64>]) -> Result<()> {
        if slices.len() != self.n_slices() {
            return Err(PowerSpectrumError::shape_mismatch(
                format!("{} slices", self.n_slices()),
                format!("{} slices", slices.len()),
            ));
        }

        let ns = self.ns();
        for slice in slices {
            if slice.dim() != (ns, ns) {
                return Err(PowerSpectrumError::shape_mismatch(
                    format!("{:?}", (ns, ns)),
                    format!("{:?}", slice.dim()),
                ));
            }
        }
        Ok(())
    }
}

/// Expand a packed power spectrum into its $L+1$ symmetric slices.
pub fn decompose(vector: ArrayView1<f64>, shape: PowerSpectrumShape) -> Result<Vec<Array2<f64>>> {
    if vector.len() != shape.packed_len() {
        return Err(PowerSpectrumError::shape_mismatch(
            shape.packed_len(),
            vector.len(),
        ));
    }

    let ns = shape.ns();
    let mut slices = vec![Array2::<f64>::zeros((ns, ns)); shape.n_slices()];
    let mut offset = 0;

    for n1 in 0..ns {
        for n2 in 0..=n1 {
            for (l, slice) in slices.iter_mut().enumerate() {
                let value = vector[offset + l];
                if n1 == n2 {
                    slice[[n1, n2]] = value;
                } else {
                    let value = value * FRAC_1_SQRT_2;
                    slice[[n1, n2]] = value;
                    slice[[n2, n1]] = value;
                }
            }
            offset += shape.n_slices();
        }
    }

    Ok(slices)
}

/// Pack symmetric slices back into a power spectrum vector.
///
/// This is the inverse of [`decompose`] up to rounding: off-diagonal values are
/// scaled by $2^{1/2}$ after $2^{-1/2}$, so a round trip agrees to a few ulps.
/// Only the lower triangle of each slice is read.
pub fn pack(slices: &[Array2<f64>], shape: PowerSpectrumShape) -> Result<Array1<f64>> {
    shape.check_slices(slices)?;

    let ns = shape.ns();
    let mut vector = Vec::with_capacity(shape.packed_len());

    for n1 in 0..ns {
        for n2 in 0..=n1 {
            for slice in slices {
                if n1 == n2 {
                    vector.push(slice[[n1, n2]]);
                } else {
                    vector.push(slice[[n1, n2]] * SQRT_2);
                }
            }
        }
    }

    Ok(Array1::from(vector))
}

/// Return `vector` scaled to unit l2 norm. A zero vector is returned unchanged.
pub fn normalize(vector: ArrayView1<f64>) -> Array1<f64> {
    let norm = vector.norm_l2();
    if norm > 0.0 {
        vector.mapv(|item| item / norm)
    } else {
        vector.to_owned()
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::arr1;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_shape_lengths() {
        let shape = PowerSpectrumShape::new(4, 3, 2).unwrap();

        assert_eq!(shape.ns(), 8);
        assert_eq!(shape.packed_len(), 8 * 9 * 4 / 2);
        assert_eq!(shape.projection_width(), 7);
        assert_eq!(shape.compressed_len(), 8 * 16);
        assert!(shape.compression_ratio() < 1.0);
    }

    #[test]
    fn test_compressed_len_saturates_for_small_ns() {
        // ns = 2 < 2L + 1, so l = 1 and l = 2 are projected on two columns only.
        let shape = PowerSpectrumShape::new(2, 2, 1).unwrap();

        assert_eq!(shape.projection_width(), 2);
        assert_eq!(shape.slice_width(0), 1);
        assert_eq!(shape.slice_width(2), 2);
        assert_eq!(shape.compressed_len(), 2 * (1 + 2 + 2));
    }

    #[test]
    fn test_invalid_shape() {
        assert!(matches!(
            PowerSpectrumShape::new(0, 3, 1),
            Err(PowerSpectrumError::InvalidShape)
        ));
        assert!(matches!(
            PowerSpectrumShape::new(3, 3, 0),
            Err(PowerSpectrumError::InvalidShape)
        ));
    }

    #[test]
    fn test_decompose_layout() {
        // ns = 2, L = 1: pairs (0,0), (1,0), (1,1) with two values each.
        let shape = PowerSpectrumShape::new(2, 1, 1).unwrap();
        let vector = arr1(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let slices = decompose(vector.view(), shape).unwrap();

        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0][[0, 0]], 1.0);
        assert_eq!(slices[1][[0, 0]], 2.0);
        assert!((slices[0][[1, 0]] - 3.0 * FRAC_1_SQRT_2).abs() < 1E-15);
        assert_eq!(slices[0][[1, 0]], slices[0][[0, 1]]);
        assert!((slices[1][[0, 1]] - 4.0 * FRAC_1_SQRT_2).abs() < 1E-15);
        assert_eq!(slices[0][[1, 1]], 5.0);
        assert_eq!(slices[1][[1, 1]], 6.0);
    }

    #[test]
    fn test_decompose_wrong_length() {
        let shape = PowerSpectrumShape::new(2, 1, 1).unwrap();
        let vector = arr1(&[1.0, 2.0, 3.0]);

        assert!(matches!(
            decompose(vector.view(), shape),
            Err(PowerSpectrumError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_pack_inverts_decompose() {
        let shape = PowerSpectrumShape::new(3, 2, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let vector = Array1::from_iter((0..shape.packed_len()).map(|_| rng.gen_range(-1.0..1.0)));

        let slices = decompose(vector.view(), shape).unwrap();
        let packed = pack(&slices, shape).unwrap();

        assert_eq!(packed.len(), vector.len());
        for (&actual, &expected) in packed.iter().zip(vector.iter()) {
            assert!((actual - expected).abs() <= 1E-15 * expected.abs());
        }

        // Diagonal entries are copied without scaling.
        for n in 0..shape.ns() {
            let offset = (n * (n + 1) / 2 + n) * shape.n_slices();
            for l in 0..shape.n_slices() {
                assert_eq!(packed[offset + l], vector[offset + l]);
            }
        }
    }

    #[test]
    fn test_pack_rejects_wrong_slice_count() {
        let shape = PowerSpectrumShape::new(2, 1, 1).unwrap();
        let slices = vec![Array2::<f64>::zeros((2, 2))];

        assert!(matches!(
            pack(&slices, shape),
            Err(PowerSpectrumError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_normalize() {
        let vector = arr1(&[3.0, 0.0, 4.0]);
        let normalized = normalize(vector.view());
        assert!((normalized.norm_l2() - 1.0).abs() < 1E-15);
        assert_eq!(normalize(Array1::<f64>::zeros(3).view()), Array1::<f64>::zeros(3));
    }
}
