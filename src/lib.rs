//! Compression of SOAP-like power spectra by random projection.
//!
//! A power spectrum is a collection of symmetric positive semi-definite matrices
//! $P_l$, one per angular degree $l = 0, \dots, L$, each of size $NS\times NS$.
//! Each $P_l$ has rank at most $2l+1$ and is stored as $W_l^TP_l$ with $W_l$ the
//! first $2l+1$ columns of a fixed random matrix $W$. Knowing $W$, the slice is
//! recovered exactly from its projection through a reduced eigendecomposition.
//!
//! ```no_run
//! use power_spectrum_compression::*;
//!
//! let shape = PowerSpectrumShape::new(8, 4, 2).unwrap();
//! let codec = Codec::new(shape, CompressionConfig::default(), &mut rand::thread_rng());
//!
//! let spectrum = ndarray::Array1::<f64>::zeros(shape.packed_len());
//! let compressed = codec.compress(spectrum.view()).unwrap();
//! let slices = codec.decompress(compressed.view()).unwrap();
//! ```

pub mod codec;
pub mod compressor;
pub mod config;
pub mod decompressor;
pub mod pivoted_qr;
pub mod projection;
pub mod random_matrix;
pub mod rank;
pub mod slices;
pub mod types;
pub mod verify;

pub use codec::Codec;
pub use compressor::{compress, compress_slice, compress_vector, flatten, unflatten};
pub use config::CompressionConfig;
pub use decompressor::{
    decompress, decompress_all, reconstruct, Reconstruction, EIGENVALUE_CLAMP_FACTOR,
};
pub use projection::ProjectionKey;
pub use random_matrix::RandomMatrix;
pub use rank::{independent_rows, IndependentRows, RankEstimator};
pub use slices::{decompose, normalize, pack, PowerSpectrumShape};
pub use types::{PowerSpectrumError, RelDiff, Result};
pub use verify::{check_round_trip, check_round_trip_with_map, verify};
