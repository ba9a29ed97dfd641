//! Sparse sketch application
//!
//! Multiplies a dense operand by a (sub-block of a) sparse sketching
//! operator. The operator's coordinate triple is walked once per product;
//! entries falling outside the addressed sub-block window are skipped, so a
//! sub-block apply never requires re-sampling.

use crate::base::{dims_before_op, Layout, Op};
use crate::dtype::Scalar;
use crate::error::{Error, Result};
use crate::gemm::{min_ld, required_len, strides};
use crate::rng::CounterRng;
use crate::sparse::SparseSkOp;

/// Scale `rows x cols` of `c` by `beta` in place (clearing when `beta == 0`)
fn scale_dense<T: Scalar>(c: &mut [T], rows: usize, cols: usize, c_rs: usize, c_cs: usize, beta: T) {
    for i in 0..rows {
        for j in 0..cols {
            let v = &mut c[i * c_rs + j * c_cs];
            *v = if beta == T::zero() {
                T::zero()
            } else {
                beta * *v
            };
        }
    }
}

/// Sketch from the left: `B := alpha * op(submat(S)) * op(A) + beta * B`
///
/// `op(submat(S))` is `d x m`, `op(A)` is `m x n`, and `B` is `d x n`; `S` is
/// sparse and its sub-block starts at `(row_offset, col_offset)` of the
/// parent. Samples `S` on demand if it has not been filled.
///
/// # Errors
///
/// Returns an error for zero dimensions, an out-of-bounds sub-block, a
/// leading dimension below its minimum, or an undersized buffer.
#[allow(clippy::too_many_arguments)]
pub fn sketch_sparse_left<T, G>(
    layout: Layout,
    op_s: Op,
    op_a: Op,
    d: usize,
    n: usize,
    m: usize,
    alpha: T,
    s: &mut SparseSkOp<'_, T, G>,
    row_offset: usize,
    col_offset: usize,
    a: &[T],
    lda: usize,
    beta: T,
    b: &mut [T],
    ldb: usize,
) -> Result<()>
where
    T: Scalar,
    G: CounterRng,
{
    Error::require_positive("d", d)?;
    Error::require_positive("n", n)?;
    Error::require_positive("m", m)?;
    let (rows_s, cols_s) = dims_before_op(d, m, op_s);
    crate::base::check_submatrix(
        s.dist().n_rows,
        s.dist().n_cols,
        row_offset,
        col_offset,
        rows_s,
        cols_s,
    )?;
    let (rows_a, cols_a) = dims_before_op(m, n, op_a);
    Error::require_ld("lda", lda, min_ld(layout, rows_a, cols_a))?;
    Error::require_ld("ldb", ldb, min_ld(layout, d, n))?;
    Error::require_len("a", a.len(), required_len(layout, rows_a, cols_a, lda))?;
    Error::require_len("b", b.len(), required_len(layout, d, n, ldb))?;
    s.fill()?;

    let (b_rs, b_cs) = strides(layout, ldb);
    scale_dense(b, d, n, b_rs, b_cs, beta);
    if alpha == T::zero() {
        return Ok(());
    }

    // Strides of op(A) over (p, j).
    let (a_rs, a_cs) = strides(layout, lda);
    let (a_ps, a_js) = match op_a {
        Op::NoTrans => (a_rs, a_cs),
        Op::Trans => (a_cs, a_rs),
    };

    let (s_rows, s_cols, s_vals) = (s.rows(), s.cols(), s.vals());
    for t in 0..s_vals.len() {
        // Coordinate within op(submat(S)): row of B, contraction index.
        let (pi, pj) = match op_s {
            Op::NoTrans => (s_rows[t], s_cols[t]),
            Op::Trans => (s_cols[t], s_rows[t]),
        };
        let (ro, co) = match op_s {
            Op::NoTrans => (row_offset as i64, col_offset as i64),
            Op::Trans => (col_offset as i64, row_offset as i64),
        };
        let (i, p) = (pi - ro, pj - co);
        if i < 0 || i >= d as i64 || p < 0 || p >= m as i64 {
            continue;
        }
        let (i, p) = (i as usize, p as usize);
        let coef = alpha * s_vals[t];
        for j in 0..n {
            b[i * b_rs + j * b_cs] = b[i * b_rs + j * b_cs] + coef * a[p * a_ps + j * a_js];
        }
    }
    Ok(())
}

/// Sketch from the right: `B := alpha * op(A) * op(submat(S)) + beta * B`
///
/// `op(A)` is `m x n`, `op(submat(S))` is `n x d`, and `B` is `m x d`.
/// Mirrors [`sketch_sparse_left`].
///
/// # Errors
///
/// Same conditions as [`sketch_sparse_left`].
#[allow(clippy::too_many_arguments)]
pub fn sketch_sparse_right<T, G>(
    layout: Layout,
    op_a: Op,
    op_s: Op,
    m: usize,
    d: usize,
    n: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    s: &mut SparseSkOp<'_, T, G>,
    row_offset: usize,
    col_offset: usize,
    beta: T,
    b: &mut [T],
    ldb: usize,
) -> Result<()>
where
    T: Scalar,
    G: CounterRng,
{
    Error::require_positive("m", m)?;
    Error::require_positive("d", d)?;
    Error::require_positive("n", n)?;
    let (rows_s, cols_s) = dims_before_op(n, d, op_s);
    crate::base::check_submatrix(
        s.dist().n_rows,
        s.dist().n_cols,
        row_offset,
        col_offset,
        rows_s,
        cols_s,
    )?;
    let (rows_a, cols_a) = dims_before_op(m, n, op_a);
    Error::require_ld("lda", lda, min_ld(layout, rows_a, cols_a))?;
    Error::require_ld("ldb", ldb, min_ld(layout, m, d))?;
    Error::require_len("a", a.len(), required_len(layout, rows_a, cols_a, lda))?;
    Error::require_len("b", b.len(), required_len(layout, m, d, ldb))?;
    s.fill()?;

    let (b_rs, b_cs) = strides(layout, ldb);
    scale_dense(b, m, d, b_rs, b_cs, beta);
    if alpha == T::zero() {
        return Ok(());
    }

    // Strides of op(A) over (i, p).
    let (a_rs, a_cs) = strides(layout, lda);
    let (a_is, a_ps) = match op_a {
        Op::NoTrans => (a_rs, a_cs),
        Op::Trans => (a_cs, a_rs),
    };

    let (s_rows, s_cols, s_vals) = (s.rows(), s.cols(), s.vals());
    for t in 0..s_vals.len() {
        // Coordinate within op(submat(S)): contraction index, column of B.
        let (pp, pq) = match op_s {
            Op::NoTrans => (s_rows[t], s_cols[t]),
            Op::Trans => (s_cols[t], s_rows[t]),
        };
        let (ro, co) = match op_s {
            Op::NoTrans => (row_offset as i64, col_offset as i64),
            Op::Trans => (col_offset as i64, row_offset as i64),
        };
        let (p, q) = (pp - ro, pq - co);
        if p < 0 || p >= n as i64 || q < 0 || q >= d as i64 {
            continue;
        }
        let (p, q) = (p as usize, q as usize);
        let coef = alpha * s_vals[t];
        for i in 0..m {
            b[i * b_rs + q * b_cs] = b[i * b_rs + q * b_cs] + coef * a[i * a_is + p * a_ps];
        }
    }
    Ok(())
}
