//! A compression session bundling the shape, the projection key and the configuration.

use crate::compressor;
use crate::config::CompressionConfig;
use crate::decompressor::{self, Reconstruction};
use crate::projection::ProjectionKey;
use crate::slices::PowerSpectrumShape;
use crate::types::{PowerSpectrumError, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use rayon::prelude::*;
use tracing::debug;

/// Compression session.
///
/// The key is drawn once and then shared read-only by every compression and
/// decompression of the session. Independent sessions can coexist, each with its
/// own key.
#[derive(Clone, Debug)]
pub struct Codec {
    key: ProjectionKey,
    config: CompressionConfig,
}

impl Codec {
    /// Start a new session with a freshly drawn key.
    pub fn new<R: Rng>(shape: PowerSpectrumShape, config: CompressionConfig, rng: &mut R) -> Self {
        let key = ProjectionKey::generate(shape, rng);
        debug!(
            ns = shape.ns(),
            l_max = shape.l_max(),
            ratio = shape.compression_ratio(),
            "generated projection key"
        );
        Codec { key, config }
    }

    /// Resume a session from an existing key.
    pub fn with_key(key: ProjectionKey, config: CompressionConfig) -> Self {
        Codec { key, config }
    }

    pub fn key(&self) -> &ProjectionKey {
        &self.key
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    pub fn shape(&self) -> PowerSpectrumShape {
        self.key.shape()
    }

    /// Compress a packed power spectrum.
    pub fn compress(&self, vector: ArrayView1<f64>) -> Result<Array1<f64>> {
        compressor::compress_vector(vector, &self.key, self.config.normalize)
    }

    /// Decompress a flattened compressed vector into one reconstruction per l.
    pub fn decompress(&self, compressed: ArrayView1<f64>) -> Result<Vec<Reconstruction>> {
        let slices = compressor::unflatten(compressed, self.shape())?;
        self.decompress_slices(&slices)
    }

    /// Decompress already separated compressed slices.
    pub fn decompress_slices(&self, compressed: &[Array2<f64>]) -> Result<Vec<Reconstruction>> {
        decompressor::decompress_all(compressed, &self.key, &self.config)
    }

    /// Compress every row of `samples` in parallel.
    ///
    /// Returns a matrix with one compressed vector per row. The first failing
    /// sample aborts the batch.
    pub fn compress_batch(&self, samples: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.check_batch(samples)?;

        let rows: Vec<_> = samples.axis_iter(Axis(0)).collect();
        let compressed = rows
            .par_iter()
            .map(|row| self.compress(row.view()))
            .collect::<Result<Vec<_>>>()?;

        let width = self.shape().compressed_len();
        let mut output = Array2::<f64>::zeros((compressed.len(), width));
        for (mut target, source) in output.axis_iter_mut(Axis(0)).zip(compressed.iter()) {
            target.assign(source);
        }

        Ok(output)
    }

    /// Decompress every row of `compressed` in parallel.
    ///
    /// Failures are reported per sample so that the caller can decide whether to
    /// skip a sample, retry it with a different key or abort.
    pub fn decompress_batch(&self, compressed: ArrayView2<f64>) -> Vec<Result<Vec<Reconstruction>>> {
        let rows: Vec<_> = compressed.axis_iter(Axis(0)).collect();
        let results: Vec<_> = rows.par_iter().map(|row| self.decompress(row.view())).collect();

        let failures = results.iter().filter(|result| result.is_err()).count();
        if failures > 0 {
            debug!(failures, samples = results.len(), "batch decompression finished with failures");
        }

        results
    }

    /// Shape check for a batch of packed power spectra.
    pub fn check_batch(&self, samples: ArrayView2<f64>) -> Result<()> {
        let expected = self.shape().packed_len();
        if samples.ncols() != expected {
            return Err(PowerSpectrumError::shape_mismatch(expected, samples.ncols()));
        }
        Ok(())
    }
}
