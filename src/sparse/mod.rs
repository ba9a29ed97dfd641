//! Sparse sketching operators
//!
//! A sparse operator has exactly `vec_nnz` nonzeros per major-axis vector,
//! sampled without replacement by an index-addressable Fisher-Yates scheme:
//! each vector's draws start from the seed state advanced by
//! `vector_index * vec_nnz`, so any single vector's pattern can be reproduced
//! independently of all others.

use crate::base::MajorAxis;
use crate::coo::CooMatrix;
use crate::dtype::Scalar;
use crate::error::{Error, Result};
use crate::rng::philox::Philox4x32;
use crate::rng::{CounterRng, RngState};
use log::debug;
use std::marker::PhantomData;

/// A distribution over sparse sketching operators
///
/// If short-axis major, samples have exactly `vec_nnz` nonzeros per
/// short-axis vector (per column of a wide matrix, per row of a tall one).
/// If long-axis major, per long-axis vector instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SparseDist {
    /// Matrices drawn from this distribution have this many rows
    pub n_rows: usize,
    /// Matrices drawn from this distribution have this many columns
    pub n_cols: usize,
    /// Nonzeros per major-axis vector
    pub vec_nnz: usize,
    /// Which axis sparsity is controlled along
    pub major_axis: MajorAxis,
}

impl SparseDist {
    /// Create a distribution with the default short major axis
    ///
    /// Short-axis-major sketches are more likely to contain useful geometric
    /// information without assumptions about the data being sketched.
    pub fn new(n_rows: usize, n_cols: usize, vec_nnz: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            vec_nnz,
            major_axis: MajorAxis::Short,
        }
    }

    /// Create a distribution with an explicit major axis
    pub fn with_major_axis(
        n_rows: usize,
        n_cols: usize,
        vec_nnz: usize,
        major_axis: MajorAxis,
    ) -> Self {
        Self {
            n_rows,
            n_cols,
            vec_nnz,
            major_axis,
        }
    }

    /// Length of one major-axis vector (the universe sampled from)
    #[inline]
    pub fn dim_major(&self) -> usize {
        match self.major_axis {
            MajorAxis::Short => self.n_rows.min(self.n_cols),
            MajorAxis::Long => self.n_rows.max(self.n_cols),
        }
    }

    /// Number of major-axis vectors (the axis swept during sampling)
    #[inline]
    pub fn dim_minor(&self) -> usize {
        match self.major_axis {
            MajorAxis::Short => self.n_rows.max(self.n_cols),
            MajorAxis::Long => self.n_rows.min(self.n_cols),
        }
    }

    /// Total nonzeros in a sample from this distribution
    #[inline]
    pub fn nnz(&self) -> usize {
        self.vec_nnz * self.dim_minor()
    }

    /// Whether samples have a fixed number of nonzeros per column
    pub fn has_fixed_nnz_per_col(&self) -> bool {
        match self.major_axis {
            MajorAxis::Short => self.n_rows < self.n_cols,
            MajorAxis::Long => self.n_cols < self.n_rows,
        }
    }

    /// Scale factor making a sample an isometry in expectation
    pub fn isometry_scale(&self) -> f64 {
        let vec_nnz = self.vec_nnz as f64;
        match self.major_axis {
            MajorAxis::Short => vec_nnz.powf(-0.5),
            MajorAxis::Long => {
                let minor_len = self.n_rows.min(self.n_cols) as f64;
                let major_len = self.n_rows.max(self.n_cols) as f64;
                (major_len / (vec_nnz * minor_len)).sqrt()
            }
        }
    }

    /// The state that seeds the next independent draw after a full sample
    ///
    /// The stride is `dim_minor * vec_nnz` draws, independent of how
    /// sampling was parallelized.
    pub fn next_state(&self, seed: RngState) -> RngState {
        seed.advanced((self.dim_minor() * self.vec_nnz) as u64)
    }

    fn validate(&self) -> Result<()> {
        Error::require_positive("n_rows", self.n_rows)?;
        Error::require_positive("n_cols", self.n_cols)?;
        Error::require_positive("vec_nnz", self.vec_nnz)?;
        if self.vec_nnz > self.dim_major() {
            return Err(Error::SparsityExceedsAxis {
                vec_nnz: self.vec_nnz,
                major_len: self.dim_major(),
            });
        }
        Ok(())
    }
}

/// Sample `vec_nnz` major indices (and signs) for one vector
///
/// `work` must be the identity permutation of `0..dim_major` on entry; it is
/// restored to the identity before returning, by replaying the recorded
/// pivots in reverse.
fn sample_one_vector<T, G>(
    seed: &RngState,
    vec_idx: usize,
    vec_nnz: usize,
    dim_major: usize,
    major: &mut [i64],
    minor: &mut [i64],
    vals: &mut [T],
    work: &mut [i64],
    pivots: &mut [usize],
) where
    T: Scalar,
    G: CounterRng,
{
    let mut state = *seed;
    state.incr((vec_idx * vec_nnz) as u64);
    for j in 0..vec_nnz {
        // One step of Fisher-Yates shuffling; the same generator block
        // supplies the pivot (word 0) and the sign (word 1).
        let rv = G::generate(&state);
        let ell = j + (rv[0] as usize) % (dim_major - j);
        pivots[j] = ell;
        let swap = work[ell];
        work[ell] = work[j];
        work[j] = swap;
        major[j] = swap;
        vals[j] = if rv[1] % 2 == 0 { T::one() } else { -T::one() };
        minor[j] = vec_idx as i64;
        state.incr(1);
    }
    // Restore work to the identity so the array can be shared across
    // sequential vectors and reused for submatrix generation.
    for j in (0..vec_nnz).rev() {
        let swap = major[j];
        let ell = pivots[j];
        work[j] = work[ell];
        work[ell] = swap;
    }
}

fn identity_work(dim_major: usize) -> Vec<i64> {
    (0..dim_major as i64).collect()
}

/// Repeated Fisher-Yates sampling across `dim_minor` vectors
///
/// For each vector, performs `vec_nnz` shuffle steps over the universe
/// `0..dim_major`, writing the sampled major indices, optional minor-index
/// labels, and optional signed (+/-1) values into per-vector slices of the
/// output arrays. Within one vector the sampled major indices are pairwise
/// distinct; across vectors they may repeat.
///
/// Returns the seed advanced by `dim_minor * vec_nnz` draws.
pub fn repeated_fisher_yates<T, G>(
    state: RngState,
    vec_nnz: usize,
    dim_major: usize,
    dim_minor: usize,
    idxs_major: &mut [i64],
    idxs_minor: Option<&mut [i64]>,
    vals: Option<&mut [T]>,
) -> Result<RngState>
where
    T: Scalar,
    G: CounterRng,
{
    Error::require_positive("vec_nnz", vec_nnz)?;
    Error::require_positive("dim_major", dim_major)?;
    Error::require_positive("dim_minor", dim_minor)?;
    if vec_nnz > dim_major {
        return Err(Error::SparsityExceedsAxis {
            vec_nnz,
            major_len: dim_major,
        });
    }
    let total = vec_nnz * dim_minor;
    Error::require_len("idxs_major", idxs_major.len(), total)?;
    if let Some(ref m) = idxs_minor {
        Error::require_len("idxs_minor", m.len(), total)?;
    }
    if let Some(ref v) = vals {
        Error::require_len("vals", v.len(), total)?;
    }

    // Callers may skip the minor labels or the values; sample into local
    // scratch in that case so there is a single kernel path.
    let mut minor_scratch;
    let minor_out: &mut [i64] = match idxs_minor {
        Some(m) => m,
        None => {
            minor_scratch = vec![0i64; total];
            &mut minor_scratch
        }
    };
    let mut vals_scratch;
    let vals_out: &mut [T] = match vals {
        Some(v) => v,
        None => {
            vals_scratch = vec![T::zero(); total];
            &mut vals_scratch
        }
    };

    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        idxs_major[..total]
            .par_chunks_mut(vec_nnz)
            .zip(minor_out[..total].par_chunks_mut(vec_nnz))
            .zip(vals_out[..total].par_chunks_mut(vec_nnz))
            .enumerate()
            .for_each_init(
                || (identity_work(dim_major), vec![0usize; vec_nnz]),
                |(work, pivots), (i, ((major, minor), vals))| {
                    sample_one_vector::<T, G>(
                        &state, i, vec_nnz, dim_major, major, minor, vals, work, pivots,
                    );
                },
            );
    }
    #[cfg(not(feature = "rayon"))]
    {
        let mut work = identity_work(dim_major);
        let mut pivots = vec![0usize; vec_nnz];
        for i in 0..dim_minor {
            let lo = i * vec_nnz;
            let hi = lo + vec_nnz;
            sample_one_vector::<T, G>(
                &state,
                i,
                vec_nnz,
                dim_major,
                &mut idxs_major[lo..hi],
                &mut minor_out[lo..hi],
                &mut vals_out[lo..hi],
                &mut work,
                &mut pivots,
            );
        }
    }

    Ok(state.advanced(total as u64))
}

/// Coordinate storage of a sparse operator: owned or caller-supplied
#[derive(Debug, Clone)]
enum CooStorage<'a, T> {
    Owned {
        rows: Vec<i64>,
        cols: Vec<i64>,
        vals: Vec<T>,
    },
    Borrowed {
        rows: &'a [i64],
        cols: &'a [i64],
        vals: &'a [T],
    },
}

/// A sample from a prescribed distribution over sparse sketching operators
///
/// Stores the sample as a coordinate triple `(rows, cols, vals)` of length
/// [`SparseDist::nnz`]. Storage is either owned (allocated at construction,
/// populated by [`SparseSkOp::fill`]) or borrowed from the caller, in which
/// case it is treated as already filled and never freed by the operator.
#[derive(Debug, Clone)]
pub struct SparseSkOp<'a, T: Scalar, G: CounterRng = Philox4x32> {
    dist: SparseDist,
    seed_state: RngState,
    next_state: RngState,
    known_filled: bool,
    storage: CooStorage<'a, T>,
    _rng: PhantomData<G>,
}

impl<'a, T: Scalar, G: CounterRng> SparseSkOp<'a, T, G> {
    /// Create an operator with owned, not-yet-sampled storage
    pub fn new(dist: SparseDist, seed: RngState) -> Result<Self> {
        dist.validate()?;
        let nnz = dist.nnz();
        Ok(Self {
            dist,
            seed_state: seed,
            next_state: dist.next_state(seed),
            known_filled: false,
            storage: CooStorage::Owned {
                rows: vec![0; nnz],
                cols: vec![0; nnz],
                vals: vec![T::zero(); nnz],
            },
            _rng: PhantomData,
        })
    }

    /// Create an operator and sample its coordinate data immediately
    ///
    /// Equivalent to [`SparseSkOp::new`] followed by [`SparseSkOp::fill`].
    pub fn materialized(dist: SparseDist, seed: RngState) -> Result<Self> {
        let mut s = Self::new(dist, seed)?;
        s.fill()?;
        Ok(s)
    }

    /// Create an operator over caller-owned, already-sampled storage
    pub fn with_storage(
        dist: SparseDist,
        seed: RngState,
        rows: &'a [i64],
        cols: &'a [i64],
        vals: &'a [T],
    ) -> Result<Self> {
        dist.validate()?;
        let nnz = dist.nnz();
        Error::require_len("rows", rows.len(), nnz)?;
        Error::require_len("cols", cols.len(), nnz)?;
        Error::require_len("vals", vals.len(), nnz)?;
        Ok(Self {
            dist,
            seed_state: seed,
            next_state: dist.next_state(seed),
            known_filled: true,
            storage: CooStorage::Borrowed { rows, cols, vals },
            _rng: PhantomData,
        })
    }

    /// The distribution this operator was sampled from
    #[inline]
    pub fn dist(&self) -> &SparseDist {
        &self.dist
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

    /// Whether the coordinate data has already been sampled
    #[inline]
    pub fn known_filled(&self) -> bool {
        self.known_filled
    }

    /// Total nonzeros in this operator
    #[inline]
    pub fn nnz(&self) -> usize {
        self.dist.nnz()
    }

    /// Row indices of the coordinate triple
    #[inline]
    pub fn rows(&self) -> &[i64] {
        match &self.storage {
            CooStorage::Owned { rows, .. } => rows,
            CooStorage::Borrowed { rows, .. } => rows,
        }
    }

    /// Column indices of the coordinate triple
    #[inline]
    pub fn cols(&self) -> &[i64] {
        match &self.storage {
            CooStorage::Owned { cols, .. } => cols,
            CooStorage::Borrowed { cols, .. } => cols,
        }
    }

    /// Values of the coordinate triple
    #[inline]
    pub fn vals(&self) -> &[T] {
        match &self.storage {
            CooStorage::Owned { vals, .. } => vals,
            CooStorage::Borrowed { vals, .. } => vals,
        }
    }

    /// Sample the coordinate data from the seed state
    ///
    /// Idempotent: a no-op when the data is already known to be filled.
    pub fn fill(&mut self) -> Result<()> {
        if self.known_filled {
            return Ok(());
        }
        debug!(
            "sampling {}x{} sparse operator, vec_nnz={}",
            self.dist.n_rows, self.dist.n_cols, self.dist.vec_nnz
        );
        let dist = self.dist;
        let seed = self.seed_state;
        let is_wide = dist.n_rows <= dist.n_cols;
        let (rows, cols, vals) = match &mut self.storage {
            CooStorage::Owned { rows, cols, vals } => (rows, cols, vals),
            CooStorage::Borrowed { .. } => {
                return Err(Error::Unsupported {
                    op: "SparseSkOp::fill",
                    reason: "cannot sample into borrowed storage",
                })
            }
        };
        // Route the (major, minor) index arrays by which axis is sampled.
        let (short_idxs, long_idxs) = if is_wide {
            (rows.as_mut_slice(), cols.as_mut_slice())
        } else {
            (cols.as_mut_slice(), rows.as_mut_slice())
        };
        let short_len = dist.n_rows.min(dist.n_cols);
        let long_len = dist.n_rows.max(dist.n_cols);
        match dist.major_axis {
            MajorAxis::Short => repeated_fisher_yates::<T, G>(
                seed,
                dist.vec_nnz,
                short_len,
                long_len,
                short_idxs,
                Some(long_idxs),
                Some(vals),
            )?,
            MajorAxis::Long => repeated_fisher_yates::<T, G>(
                seed,
                dist.vec_nnz,
                long_len,
                short_len,
                long_idxs,
                Some(short_idxs),
                Some(vals),
            )?,
        };
        self.known_filled = true;
        Ok(())
    }

    /// A read-only coordinate view of this operator, sampling on demand
    pub fn coo_view(&mut self) -> Result<CooMatrix<'_, T>> {
        self.fill()?;
        CooMatrix::new(
            self.dist.n_rows,
            self.dist.n_cols,
            self.rows(),
            self.cols(),
            self.vals(),
        )
    }

    /// The transpose of this operator, sharing the same coordinate storage
    ///
    /// Rows and columns are dimension-swapped and `next_state` is carried
    /// over unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if this operator has not been filled: transposing an
    /// unmaterialized operator would silently decouple its sampled data from
    /// its seed.
    pub fn transpose(&self) -> Result<SparseSkOp<'_, T, G>> {
        if !self.known_filled {
            return Err(Error::Unsupported {
                op: "SparseSkOp::transpose",
                reason: "operator must be filled before transposition",
            });
        }
        let dist = SparseDist {
            n_rows: self.dist.n_cols,
            n_cols: self.dist.n_rows,
            vec_nnz: self.dist.vec_nnz,
            major_axis: self.dist.major_axis,
        };
        Ok(SparseSkOp {
            dist,
            seed_state: self.seed_state,
            next_state: self.next_state,
            known_filled: true,
            storage: CooStorage::Borrowed {
                rows: self.cols(),
                cols: self.rows(),
                vals: self.vals(),
            },
            _rng: PhantomData,
        })
    }
}

/// Sample the coordinate data of `s` from its seed state
///
/// Free-function form of [`SparseSkOp::fill`].
pub fn fill_sparse<T: Scalar, G: CounterRng>(s: &mut SparseSkOp<'_, T, G>) -> Result<()> {
    s.fill()
}
