//! The random projection key shared by compression and decompression.

use crate::random_matrix::RandomMatrix;
use crate::slices::PowerSpectrumShape;
use crate::types::{PowerSpectrumError, Result};
use ndarray::{s, Array2, ArrayView2};
use rand::Rng;

/// Lower bound of the uniformly drawn key entries.
pub const KEY_ENTRY_MIN: f64 = 0.1;
/// Upper bound of the uniformly drawn key entries.
pub const KEY_ENTRY_MAX: f64 = 0.9;

/// A fixed random matrix $W$ of shape $(NS, \min(NS, 2L+1))$.
///
/// The slice for degree $l$ is projected onto the first $2l+1$ columns of $W$.
/// The key is never modified after creation. Compressed data can only be
/// decompressed with the exact key that produced it, so a key must be stored
/// next to any compressed vectors that are persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectionKey {
    matrix: Array2<f64>,
    shape: PowerSpectrumShape,
}

impl ProjectionKey {
    /// Draw a new key with entries uniformly distributed in
    /// [`KEY_ENTRY_MIN`], [`KEY_ENTRY_MAX`].
    pub fn generate<R: Rng>(shape: PowerSpectrumShape, rng: &mut R) -> Self {
        let matrix = f64::random_uniform(
            (shape.ns(), shape.projection_width()),
            KEY_ENTRY_MIN,
            KEY_ENTRY_MAX,
            rng,
        );

        ProjectionKey { matrix, shape }
    }

    /// Rebuild a key from a stored matrix.
    pub fn from_matrix(matrix: Array2<f64>, shape: PowerSpectrumShape) -> Result<Self> {
        let expected = (shape.ns(), shape.projection_width());
        if matrix.dim() != expected {
            return Err(PowerSpectrumError::shape_mismatch(
                format!("{:?}", expected),
                format!("{:?}", matrix.dim()),
            ));
        }

        Ok(ProjectionKey { matrix, shape })
    }

    /// The full projection matrix.
    pub fn matrix(&self) -> ArrayView2<f64> {
        self.matrix.view()
    }

    pub fn shape(&self) -> PowerSpectrumShape {
        self.shape
    }

    /// The projection map $W_l$ for degree `l`: the first $\min(2l+1, NS)$ columns.
    pub fn columns(&self, l: usize) -> ArrayView2<f64> {
        let width = self.shape.slice_width(l).min(self.matrix.ncols());
        self.matrix.slice(s![.., 0..width])
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_shape_and_range() {
        let shape = PowerSpectrumShape::new(5, 3, 2).unwrap();
        let key = ProjectionKey::generate(shape, &mut StdRng::seed_from_u64(0));

        assert_eq!(key.matrix().dim(), (10, 7));
        assert!(key
            .matrix()
            .iter()
            .all(|&item| (KEY_ENTRY_MIN..=KEY_ENTRY_MAX).contains(&item)));
    }

    #[test]
    fn test_columns_are_leading_columns() {
        let shape = PowerSpectrumShape::new(5, 3, 2).unwrap();
        let key = ProjectionKey::generate(shape, &mut StdRng::seed_from_u64(0));

        for l in 0..=3 {
            let columns = key.columns(l);
            assert_eq!(columns.dim(), (10, 2 * l + 1));
            assert_eq!(columns, key.matrix().slice(s![.., 0..2 * l + 1]));
        }
    }

    #[test]
    fn test_columns_saturate_for_small_ns() {
        let shape = PowerSpectrumShape::new(2, 3, 1).unwrap();
        let key = ProjectionKey::generate(shape, &mut StdRng::seed_from_u64(0));

        assert_eq!(key.matrix().dim(), (2, 2));
        assert_eq!(key.columns(0).ncols(), 1);
        assert_eq!(key.columns(3).ncols(), 2);
    }

    #[test]
    fn test_from_matrix_round_trip() {
        let shape = PowerSpectrumShape::new(4, 1, 1).unwrap();
        let key = ProjectionKey::generate(shape, &mut StdRng::seed_from_u64(9));

        let restored = ProjectionKey::from_matrix(key.matrix().to_owned(), shape).unwrap();
        assert_eq!(restored, key);

        assert!(matches!(
            ProjectionKey::from_matrix(Array2::zeros((4, 2)), shape),
            Err(PowerSpectrumError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_independent_sessions_differ() {
        let shape = PowerSpectrumShape::new(4, 1, 1).unwrap();
        let first = ProjectionKey::generate(shape, &mut StdRng::seed_from_u64(1));
        let second = ProjectionKey::generate(shape, &mut StdRng::seed_from_u64(2));

        assert_ne!(first, second);
    }
}
