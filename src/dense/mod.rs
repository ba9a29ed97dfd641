//! Dense sketching operators
//!
//! A sketching operator is "dense" if applying it to a dense matrix takes
//! level-3 BLAS work. All dense operators here have i.i.d. entries; the
//! [`DenseDist`] descriptor fully determines the counter-to-value mapping and
//! the stride added to a seed state to obtain the next independent draw.

mod fill;

pub use fill::{fill_dense, fill_dense_submat, fill_submat};

use crate::base::{Layout, MajorAxis};
use crate::dtype::Scalar;
use crate::error::{Error, Result};
use crate::rng::philox::Philox4x32;
use crate::rng::{CounterRng, RngState, BLOCK_WORDS};
use log::debug;
use std::borrow::Cow;
use std::marker::PhantomData;

/// Entry distribution of a dense sketching operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenseDistName {
    /// Gaussian distribution with mean 0 and standard deviation 1
    Gaussian,
    /// Uniform distribution over [-1, 1]
    Uniform,
    /// Entries are defined only by a user-provided buffer; no generation rule
    BlackBox,
}

/// A distribution over dense sketching operators
///
/// Immutable once constructed. Dimensions must be positive; construction
/// through [`DenseDist::new`] enforces this at the entry points that consume
/// the distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenseDist {
    /// Matrices drawn from this distribution have this many rows
    pub n_rows: usize,
    /// Matrices drawn from this distribution have this many columns
    pub n_cols: usize,
    /// The distribution of the entries
    pub family: DenseDistName,
    /// The order in which the buffer is populated when sampling i.i.d.
    pub major_axis: MajorAxis,
}

impl DenseDist {
    /// Create a distribution with the default long major axis
    pub fn new(n_rows: usize, n_cols: usize, family: DenseDistName) -> Self {
        Self {
            n_rows,
            n_cols,
            family,
            major_axis: MajorAxis::Long,
        }
    }

    /// Create a distribution with an explicit major axis
    pub fn with_major_axis(
        n_rows: usize,
        n_cols: usize,
        family: DenseDistName,
        major_axis: MajorAxis,
    ) -> Self {
        Self {
            n_rows,
            n_cols,
            family,
            major_axis,
        }
    }

    /// Total number of random elements a sample from this distribution holds
    #[inline]
    pub fn num_elements(&self) -> usize {
        self.n_rows * self.n_cols
    }

    /// Length of one major-axis vector
    #[inline]
    pub fn major_len(&self) -> usize {
        match self.major_axis {
            MajorAxis::Long => self.n_rows.max(self.n_cols),
            MajorAxis::Short => self.n_rows.min(self.n_cols),
        }
    }

    /// The natural storage layout: major-axis vectors are contiguous
    ///
    /// A wide long-major (or tall short-major) matrix stores its rows
    /// contiguously; the other two combinations store columns contiguously.
    pub fn layout(&self) -> Layout {
        let is_wide = self.n_rows < self.n_cols;
        let is_long = self.major_axis == MajorAxis::Long;
        if is_wide == is_long {
            Layout::RowMajor
        } else {
            Layout::ColMajor
        }
    }

    /// The state that seeds the next independent draw after a full sample
    ///
    /// Derived from the full parent's element count, never from how much of
    /// the buffer has actually been realized, so interleaved partial
    /// realizations cannot collide with subsequent draws.
    pub fn next_state(&self, seed: RngState) -> RngState {
        let blocks = self.num_elements().div_ceil(BLOCK_WORDS) as u64;
        seed.advanced(blocks)
    }

    fn validate(&self) -> Result<()> {
        Error::require_positive("n_rows", self.n_rows)?;
        Error::require_positive("n_cols", self.n_cols)?;
        Ok(())
    }
}

/// A sample from a prescribed distribution over dense sketching operators
///
/// Couples a distribution with a seed state, an optional materialized buffer,
/// and a precomputed next state. The buffer may be owned (allocated by
/// [`DenseSkOp::realize`]) or borrowed from the caller; borrowed storage is
/// never freed by the operator and must outlive it.
///
/// `next_state` is computed from the distribution and seed alone, so it can
/// seed a subsequent independent draw before or after realization.
#[derive(Debug, Clone)]
pub struct DenseSkOp<'a, T: Scalar, G: CounterRng = Philox4x32> {
    dist: DenseDist,
    seed_state: RngState,
    next_state: RngState,
    layout: Layout,
    buffer: Option<Cow<'a, [T]>>,
    _rng: PhantomData<G>,
}

impl<'a, T: Scalar, G: CounterRng> DenseSkOp<'a, T, G> {
    /// Create an unmaterialized operator from a distribution and seed
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive dimensions, or for the `BlackBox`
    /// family, which carries no generation rule and therefore requires a
    /// user-supplied buffer (see [`DenseSkOp::with_buffer`]).
    pub fn new(dist: DenseDist, seed: RngState) -> Result<Self> {
        dist.validate()?;
        if dist.family == DenseDistName::BlackBox {
            return Err(Error::Unsupported {
                op: "DenseSkOp::new",
                reason: "BlackBox operators require a user-supplied buffer",
            });
        }
        Ok(Self {
            dist,
            seed_state: seed,
            next_state: dist.next_state(seed),
            layout: dist.layout(),
            buffer: None,
            _rng: PhantomData,
        })
    }

    /// Create an operator and populate its buffer immediately
    ///
    /// Equivalent to [`DenseSkOp::new`] followed by [`DenseSkOp::realize`].
    pub fn materialized(dist: DenseDist, seed: RngState) -> Result<Self> {
        let mut s = Self::new(dist, seed)?;
        s.realize()?;
        Ok(s)
    }

    /// Create an operator backed by externally owned storage
    ///
    /// The buffer is treated as already filled (layout per
    /// [`DenseDist::layout`]) and is never freed by the operator. This is the
    /// only constructor that accepts the `BlackBox` family.
    pub fn with_buffer(dist: DenseDist, seed: RngState, buffer: &'a [T]) -> Result<Self> {
        dist.validate()?;
        Error::require_len("buffer", buffer.len(), dist.num_elements())?;
        // BlackBox consumes no randomness; its next state is the seed itself.
        let next_state = match dist.family {
            DenseDistName::BlackBox => seed,
            _ => dist.next_state(seed),
        };
        Ok(Self {
            dist,
            seed_state: seed,
            next_state,
            layout: dist.layout(),
            buffer: Some(Cow::Borrowed(buffer)),
            _rng: PhantomData,
        })
    }

    /// The distribution this operator was sampled from
    #[inline]
    pub fn dist(&self) -> &DenseDist {
        &self.dist
    }

    /// Storage layout of the (possibly not yet materialized) buffer
    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// The state that seeds this operator's own sampling
    #[inline]
    pub fn seed_state(&self) -> RngState {
        self.seed_state
    }

    /// The state that seeds the next independent draw after this operator
    #[inline]
    pub fn next_state(&self) -> RngState {
        self.next_state
    }

    /// Whether the operator's buffer has been populated
    #[inline]
    pub fn is_materialized(&self) -> bool {
        self.buffer.is_some()
    }

    /// The materialized buffer, if any
    #[inline]
    pub fn buffer(&self) -> Option<&[T]> {
        self.buffer.as_deref()
    }

    /// Populate the operator's buffer from its seed state
    ///
    /// Idempotent: if the operator is already materialized (including via a
    /// user-supplied buffer) this is a no-op and neither the buffer nor
    /// `next_state` changes.
    pub fn realize(&mut self) -> Result<()> {
        if self.buffer.is_some() {
            return Ok(());
        }
        debug!(
            "realizing {}x{} dense operator ({:?})",
            self.dist.n_rows, self.dist.n_cols, self.dist.family
        );
        let mut buf = vec![T::zero(); self.dist.num_elements()];
        fill_dense::<T, G>(&self.dist, &mut buf, self.seed_state)?;
        self.buffer = Some(Cow::Owned(buf));
        Ok(())
    }
}
