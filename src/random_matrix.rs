//! Generation of random matrices for various types

use ndarray::Array2;
use ndarray_linalg::Scalar;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal, Uniform};

pub trait RandomMatrix
where
    Self: Scalar,
{
    /// Generate a random Gaussian matrix.
    ///
    /// # Arguments
    ///
    /// * `dimension`: Tuple (rows, cols) specifying the number of rows and columns.
    /// * `rng`: The random number generator to use.
    fn random_gaussian<R: Rng>(dimension: (usize, usize), rng: &mut R) -> Array2<Self>;

    /// Generate a matrix with entries drawn uniformly from `[low, high]`.
    ///
    /// # Arguments
    ///
    /// * `dimension`: Tuple (rows, cols) specifying the number of rows and columns.
    /// * `low`: Lower bound of the entries.
    /// * `high`: Upper bound of the entries.
    /// * `rng`: The random number generator to use.
    fn random_uniform<R: Rng>(
        dimension: (usize, usize),
        low: Self,
        high: Self,
        rng: &mut R,
    ) -> Array2<Self>;

    /// Generate a random symmetric positive semi-definite matrix of a given rank.
    ///
    /// The matrix is $GG^T$ with $G$ a Gaussian (dim, rank) matrix, symmetrized
    /// so that it is exactly equal to its transpose.
    fn random_psd_matrix<R: Rng>(dim: usize, rank: usize, rng: &mut R) -> Array2<Self> {
        let g = Self::random_gaussian((dim, rank), rng);
        let gram = g.dot(&g.t());
        let half = Self::from_real(Self::real(0.5));
        (&gram + &gram.t()).mapv(|item| item * half)
    }
}

macro_rules! random_matrix_impl {
    ($scalar:ty) => {
        impl RandomMatrix for $scalar {
            fn random_gaussian<R: Rng>(dimension: (usize, usize), rng: &mut R) -> Array2<$scalar> {
                let mut mat = Array2::<$scalar>::zeros(dimension);
                mat.map_inplace(|item| *item = StandardNormal.sample(rng));
                mat
            }

            fn random_uniform<R: Rng>(
                dimension: (usize, usize),
                low: $scalar,
                high: $scalar,
                rng: &mut R,
            ) -> Array2<$scalar> {
                assert!(low < high, "`low` must be smaller than `high`");

                let uniform = Uniform::new_inclusive(low, high);
                let mut mat = Array2::<$scalar>::zeros(dimension);
                mat.map_inplace(|item| *item = uniform.sample(rng));
                mat
            }
        }
    };
}

random_matrix_impl!(f32);
random_matrix_impl!(f64);

#[cfg(test)]
mod tests {

    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_uniform_entries_in_range() {
        let mut rng = StdRng::seed_from_u64(0);
        let mat = f64::random_uniform((40, 9), 0.1, 0.9, &mut rng);

        assert_eq!(mat.dim(), (40, 9));
        assert!(mat.iter().all(|&item| (0.1..=0.9).contains(&item)));
    }

    #[test]
    fn test_same_seed_same_matrix() {
        let first = f64::random_uniform((5, 3), 0.1, 0.9, &mut StdRng::seed_from_u64(3));
        let second = f64::random_uniform((5, 3), 0.1, 0.9, &mut StdRng::seed_from_u64(3));
        assert_eq!(first, second);
    }

    macro_rules! psd_tests {
        ($($name:ident: $scalar:ty, $dim:expr, $rank:expr,)*) => {
            $(
            #[test]
            fn $name() {
                use ndarray_linalg::{Eigh, UPLO};

                let mut rng = StdRng::seed_from_u64(11);
                let mat = <$scalar>::random_psd_matrix($dim, $rank, &mut rng);

                assert_eq!(mat, mat.t());

                let (eigvals, _) = mat.eigh(UPLO::Lower).unwrap();
                let largest = eigvals[eigvals.len() - 1];
                let positive = eigvals.iter().filter(|&&item| item > 1E-4 * largest).count();
                assert!(eigvals.iter().all(|&item| item > -1E-4 * largest));
                assert_eq!(positive, $rank);
            }
            )*
        };
    }

    psd_tests! {
        test_psd_f64_low_rank: f64, 12, 3,
        test_psd_f32_low_rank: f32, 12, 3,
        test_psd_f64_full_rank: f64, 6, 6,
    }
}
