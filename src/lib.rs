//! # sketchmat
//!
//! **Randomized sketching operators for dense linear algebra.**
//!
//! sketchmat generates random matrices ("sketching operators") used to compress
//! large matrices while approximately preserving their geometry, and applies
//! them to dense operands with GEMM-like entry points.
//!
//! ## Why sketchmat?
//!
//! - **Reproducible**: every value is a pure function of a counter-based RNG
//!   state, so results are identical across runs, thread counts, and work
//!   partitionings.
//! - **Lazy**: operators can be applied without ever materializing their full
//!   buffer; only the requested sub-block is synthesized.
//! - **Dense and sparse**: i.i.d. Gaussian/uniform dense operators, and
//!   fixed-nonzeros-per-vector sparse operators sampled without replacement.
//! - **No ambient entropy**: the caller's seed is the only randomness source.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use sketchmat::prelude::*;
//!
//! let dist = DenseDist::new(30, 200, DenseDistName::Gaussian);
//! let s = DenseSkOp::<f64>::new(dist, RngState::from_key(0))?;
//! // B := 1.0 * S * A + 0.0 * B, without materializing S up front
//! sketch_general_left(
//!     Layout::ColMajor, Op::NoTrans, Op::NoTrans,
//!     30, n, 200, 1.0, &s, 0, 0, &a, 200, 0.0, &mut b, 30,
//! )?;
//! ```
//!
//! ## Feature flags
//!
//! - `rayon` (default): multi-threaded fill and sampling. Output is
//!   byte-identical with the feature disabled.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod base;
pub mod coo;
pub mod dense;
pub mod dtype;
pub mod error;
pub mod gemm;
pub mod rng;
pub mod sketch;
pub mod sparse;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::base::{Layout, MajorAxis, Op};
    pub use crate::coo::CooMatrix;
    pub use crate::dense::{fill_dense, DenseDist, DenseDistName, DenseSkOp};
    pub use crate::dtype::Scalar;
    pub use crate::error::{Error, Result};
    pub use crate::rng::{philox::Philox4x32, CounterRng, RngState};
    pub use crate::sketch::{
        sketch_general_left, sketch_general_right, sketch_sparse_left, sketch_sparse_right,
    };
    pub use crate::sparse::{fill_sparse, SparseDist, SparseSkOp};
}
