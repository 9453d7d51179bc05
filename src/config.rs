//! Tolerances and switches used along the compression pipeline.

use crate::rank::RankEstimator;

/// Configuration of a compression session.
///
/// All tolerances are relative to the scale of the matrix they are applied to,
/// except `zero_tolerance` which is an absolute bound on the entries of a
/// compressed slice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompressionConfig {
    /// Relative threshold on the singular value scale used to decide
    /// whether a row of a compressed slice is linearly independent.
    pub rank_tolerance: f64,
    /// Back-end used for the numerical rank.
    pub rank_estimator: RankEstimator,
    /// A compressed slice whose entries are all below this value in
    /// magnitude is decompressed to the zero matrix.
    pub zero_tolerance: f64,
    /// Relative Frobenius error allowed between the reduced Gram matrix
    /// and its eigendecomposition.
    pub eigen_tolerance: f64,
    /// Relative Frobenius error allowed between the reprojected
    /// reconstruction and the compressed slice.
    pub verification_tolerance: f64,
    /// Unit-normalize raw power spectra before they are decomposed.
    pub normalize: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        CompressionConfig {
            rank_tolerance: 1E-10,
            rank_estimator: RankEstimator::SVD,
            zero_tolerance: 1E-14,
            eigen_tolerance: 1E-8,
            verification_tolerance: 1E-6,
            normalize: false,
        }
    }
}

impl CompressionConfig {
    pub fn with_rank_tolerance(mut self, tol: f64) -> Self {
        assert!(tol >= 0.0, "Require tol >= 0");
        self.rank_tolerance = tol;
        self
    }

    pub fn with_rank_estimator(mut self, estimator: RankEstimator) -> Self {
        self.rank_estimator = estimator;
        self
    }

    pub fn with_zero_tolerance(mut self, tol: f64) -> Self {
        assert!(tol >= 0.0, "Require tol >= 0");
        self.zero_tolerance = tol;
        self
    }

    pub fn with_eigen_tolerance(mut self, tol: f64) -> Self {
        assert!(tol > 0.0, "Require tol > 0");
        self.eigen_tolerance = tol;
        self
    }

    pub fn with_verification_tolerance(mut self, tol: f64) -> Self {
        assert!(tol > 0.0, "Require tol > 0");
        self.verification_tolerance = tol;
        self
    }

    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_chain() {
        let config = CompressionConfig::default()
            .with_rank_tolerance(1E-8)
            .with_rank_estimator(RankEstimator::QRCP)
            .with_normalization(true);

        assert_eq!(config.rank_tolerance, 1E-8);
        assert_eq!(config.rank_estimator, RankEstimator::QRCP);
        assert!(config.normalize);
        assert_eq!(
            config.verification_tolerance,
            CompressionConfig::default().verification_tolerance
        );
    }

    #[test]
    #[should_panic]
    fn test_negative_rank_tolerance_panics() {
        let _ = CompressionConfig::default().with_rank_tolerance(-1.0);
    }
}
