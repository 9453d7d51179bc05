//! Compressing and decompressing a synthetic power spectrum.
//!
//! Every slice $P_l$ is drawn as a random PSD matrix of rank $2l+1$, the same rank
//! a genuine SOAP power spectrum has. The spectrum is compressed with a fresh
//! projection key, decompressed again and compared with the original.

use ndarray::Axis;
use power_spectrum_compression::*;

pub fn main() {
    // We initialize a random number generator.
    let mut rng = rand::thread_rng();

    // Eight radial channels, two species, degrees up to four.
    let shape = PowerSpectrumShape::new(8, 4, 2).unwrap();

    let slices: Vec<_> = (0..shape.n_slices())
        .map(|l| f64::random_psd_matrix(shape.ns(), shape.slice_width(l), &mut rng))
        .collect();
    let spectrum = pack(&slices, shape).unwrap();

    let codec = Codec::new(shape, CompressionConfig::default(), &mut rng);

    let compressed = codec.compress(spectrum.view()).unwrap();

    println!(
        "Compressed {} entries into {} (ratio {:.3})",
        spectrum.len(),
        compressed.len(),
        shape.compression_ratio()
    );

    let reconstructions = codec.decompress(compressed.view()).unwrap();

    for (reconstruction, original) in reconstructions.iter().zip(slices.iter()) {
        println!(
            "l = {}: rank {}, clamped {}, relative error {:1.2E}",
            reconstruction.l,
            reconstruction.rank(),
            reconstruction.clamped_eigenvalues,
            f64::rel_diff_fro(reconstruction.matrix.view(), original.view())
        );
    }

    let reconstructed: Vec<_> = reconstructions
        .into_iter()
        .map(Reconstruction::into_matrix)
        .collect();
    let repacked = pack(&reconstructed, shape).unwrap();

    println!(
        "Relative error of the packed spectrum: {:1.2E}",
        f64::rel_diff_l2(repacked.view(), spectrum.view())
    );

    // A batch of spectra is compressed in parallel.
    let mut samples = ndarray::Array2::<f64>::zeros((16, shape.packed_len()));
    for mut row in samples.axis_iter_mut(Axis(0)) {
        row.assign(&spectrum);
    }
    let batch = codec.compress_batch(samples.view()).unwrap();
    let failures = codec
        .decompress_batch(batch.view())
        .iter()
        .filter(|result| result.is_err())
        .count();

    println!("Batch of {} samples, {} failures", batch.nrows(), failures);
}
