//! Counter-offset fill engine for dense operators
//!
//! The parent matrix is treated as a flat stream of elements, `major_len` per
//! major-axis vector. Element `e` of the stream is word `e % 4` of generator
//! block `e / 4`, so the value at any logical address is a pure function of
//! the seed and that address. Filling a sub-block reduces to per-row counter
//! arithmetic: skip to the first needed block, generate, and discard words
//! outside the requested range.
//!
//! Work is parallelized across generation rows; each row derives a private
//! counter from the shared read-only seed, so the output is independent of
//! the worker count and scheduling order.

use super::{DenseDist, DenseDistName};
use crate::base::Layout;
use crate::dtype::Scalar;
use crate::error::{Error, Result};
use crate::rng::transforms::{BlockTransform, BoxMuller, UnitUniform};
use crate::rng::{CounterRng, RngState, BLOCK_WORDS};

/// Fill one generation row covering stream addresses `i0 .. i0 + out.len()`
fn fill_row<T, G, OP>(out: &mut [T], i0: usize, seed: &RngState)
where
    T: Scalar,
    G: CounterRng,
    OP: BlockTransform,
{
    let n = out.len();
    if n == 0 {
        return;
    }
    let i1 = i0 + n - 1;
    let r0 = i0 / BLOCK_WORDS;
    let r1 = i1 / BLOCK_WORDS;
    let s0 = i0 % BLOCK_WORDS;
    let e1 = i1 % BLOCK_WORDS;

    let mut state = seed.advanced(r0 as u64);
    let mut ind = 0;
    for block in r0..=r1 {
        let vals = OP::apply(G::generate(&state));
        let start = if block == r0 { s0 } else { 0 };
        let end = if block == r1 { e1 } else { BLOCK_WORDS - 1 };
        for &v in &vals[start..=end] {
            out[ind] = T::from_f64(v);
            ind += 1;
        }
        state.incr(1);
    }
}

/// Fill an `n_srows x n_scols` sub-block of an implicit parent matrix
///
/// The parent is laid out with `major_len` elements per major-axis vector;
/// `ptr` is the linear stream address of the sub-block's first element. Rows
/// of the sub-block are written at stride `ld` (elements) into `out`, so the
/// result is the sub-block in the parent's own layout.
///
/// Any sub-block produced this way is bit-identical to the corresponding
/// slice of a whole-matrix fill with the same seed.
///
/// # Errors
///
/// Returns an error for zero dimensions, `ld < n_scols`, or an undersized
/// output buffer.
pub fn fill_submat<T, G, OP>(
    major_len: usize,
    out: &mut [T],
    n_srows: usize,
    n_scols: usize,
    ptr: usize,
    seed: RngState,
    ld: usize,
) -> Result<()>
where
    T: Scalar,
    G: CounterRng,
    OP: BlockTransform,
{
    Error::require_positive("n_srows", n_srows)?;
    Error::require_positive("n_scols", n_scols)?;
    Error::require_positive("major_len", major_len)?;
    Error::require_ld("ld", ld, n_scols)?;
    Error::require_len("out", out.len(), ld * (n_srows - 1) + n_scols)?;
    if n_scols > major_len {
        return Err(Error::RowExceedsMajorLen {
            row_len: n_scols,
            major_len,
        });
    }

    let body = |row: usize, chunk: &mut [T]| {
        let i0 = ptr + row * major_len;
        fill_row::<T, G, OP>(&mut chunk[..n_scols], i0, &seed);
    };

    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        out.par_chunks_mut(ld)
            .take(n_srows)
            .enumerate()
            .for_each(|(row, chunk)| body(row, chunk));
    }
    #[cfg(not(feature = "rayon"))]
    {
        for (row, chunk) in out.chunks_mut(ld).take(n_srows).enumerate() {
            body(row, chunk);
        }
    }
    Ok(())
}

/// Fill a sub-block of a dense distribution's implicit parent matrix
///
/// Resolves the distribution's family and storage layout, then delegates to
/// [`fill_submat`]. The sub-block starts at `(row_offset, col_offset)` of the
/// parent and is written to `out` in the parent's layout, with the sub-block's
/// own contiguous dimension as leading dimension.
///
/// Returns the state for the next independent draw, derived from the full
/// parent's block count rather than the sub-block, so interleaved partial
/// realizations never collide with subsequent draws.
///
/// # Errors
///
/// Returns an error if the sub-block exceeds the parent's bounds, or for the
/// `BlackBox` family, which has no generation rule.
pub fn fill_dense_submat<T, G>(
    dist: &DenseDist,
    out: &mut [T],
    n_sub_rows: usize,
    n_sub_cols: usize,
    row_offset: usize,
    col_offset: usize,
    seed: RngState,
) -> Result<RngState>
where
    T: Scalar,
    G: CounterRng,
{
    crate::base::check_submatrix(
        dist.n_rows,
        dist.n_cols,
        row_offset,
        col_offset,
        n_sub_rows,
        n_sub_cols,
    )?;

    // Generation sweeps major-axis vectors. Under the distribution's natural
    // layout those vectors are contiguous, so a row-major generation "row"
    // is a matrix row (RowMajor) or a matrix column (ColMajor).
    let (major_len, n_srows, n_scols, ptr) = match dist.layout() {
        Layout::RowMajor => (
            dist.n_cols,
            n_sub_rows,
            n_sub_cols,
            row_offset * dist.n_cols + col_offset,
        ),
        Layout::ColMajor => (
            dist.n_rows,
            n_sub_cols,
            n_sub_rows,
            col_offset * dist.n_rows + row_offset,
        ),
    };

    match dist.family {
        DenseDistName::Gaussian => {
            fill_submat::<T, G, BoxMuller>(major_len, out, n_srows, n_scols, ptr, seed, n_scols)?
        }
        DenseDistName::Uniform => {
            fill_submat::<T, G, UnitUniform>(major_len, out, n_srows, n_scols, ptr, seed, n_scols)?
        }
        DenseDistName::BlackBox => {
            return Err(Error::Unsupported {
                op: "fill_dense_submat",
                reason: "BlackBox distributions carry no generation rule",
            })
        }
    }
    Ok(dist.next_state(seed))
}

/// Fill a whole operator buffer and return the next seed state
///
/// `buf` receives all `n_rows * n_cols` entries in the distribution's natural
/// layout. The returned state is the seed advanced by the full parent's block
/// count (see [`DenseDist::next_state`]), making it a valid seed for a
/// subsequent independent draw.
pub fn fill_dense<T, G>(dist: &DenseDist, buf: &mut [T], seed: RngState) -> Result<RngState>
where
    T: Scalar,
    G: CounterRng,
{
    Error::require_len("buf", buf.len(), dist.num_elements())?;
    fill_dense_submat::<T, G>(dist, buf, dist.n_rows, dist.n_cols, 0, 0, seed)
}
