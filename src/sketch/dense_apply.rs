//! Dense sketch application with just-in-time sub-block synthesis

use super::axis_for_layout;
use crate::base::{check_submatrix, dims_before_op, offset_and_ldim, Layout, Op};
use crate::dense::{fill_dense_submat, DenseDist, DenseDistName, DenseSkOp};
use crate::dtype::Scalar;
use crate::error::{Error, Result};
use crate::gemm::gemm;
use crate::rng::CounterRng;
use log::debug;

/// Sketch from the left: `B := alpha * op(submat(S)) * op(A) + beta * B`
///
/// `op(submat(S))` is `d x m`, `op(A)` is `m x n`, and `B` is `d x n`. The
/// operator sub-block starts at `(row_offset, col_offset)` of `S`'s parent
/// matrix. `A` and `B` are stored in `layout` with leading dimensions `lda`
/// and `ldb`.
///
/// If `S` is unmaterialized, only the addressed sub-block is synthesized, in
/// a scratch buffer that is dropped on return; `S` itself is not modified.
///
/// # Errors
///
/// Returns an error if a dimension is zero, the sub-block exceeds the
/// parent's bounds, a leading dimension is below its minimum, or a buffer is
/// too small.
#[allow(clippy::too_many_arguments)]
pub fn sketch_general_left<T, G>(
    layout: Layout,
    op_s: Op,
    op_a: Op,
    d: usize,
    n: usize,
    m: usize,
    alpha: T,
    s: &DenseSkOp<'_, T, G>,
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
    check_submatrix(
        s.dist().n_rows,
        s.dist().n_cols,
        row_offset,
        col_offset,
        rows_s,
        cols_s,
    )?;

    let buff = match s.buffer() {
        Some(buff) => buff,
        None => {
            debug!(
                "synthesizing {}x{} sub-block at ({}, {}) for left sketch",
                rows_s, cols_s, row_offset, col_offset
            );
            let mut scratch = vec![T::zero(); rows_s * cols_s];
            fill_dense_submat::<T, G>(
                s.dist(),
                &mut scratch,
                rows_s,
                cols_s,
                row_offset,
                col_offset,
                s.seed_state(),
            )?;
            // The scratch holds the sub-block in the parent's layout with the
            // minimal leading dimension; wrap it as a buffer-backed operator
            // at offset zero and apply that instead.
            let sub_dist = DenseDist::with_major_axis(
                rows_s,
                cols_s,
                DenseDistName::BlackBox,
                axis_for_layout(rows_s, cols_s, s.layout()),
            );
            let sub = DenseSkOp::<T, G>::with_buffer(sub_dist, s.seed_state(), &scratch)?;
            return sketch_general_left(
                layout, op_s, op_a, d, n, m, alpha, &sub, 0, 0, a, lda, beta, b, ldb,
            );
        }
    };

    let (pos, lds) = offset_and_ldim(
        s.layout(),
        s.dist().n_rows,
        s.dist().n_cols,
        row_offset,
        col_offset,
    );
    // A buffer stored in the opposite layout reads as the transpose under the
    // caller's layout, with the same leading dimension.
    let op_s = if s.layout() == layout {
        op_s
    } else {
        op_s.flipped()
    };
    gemm(
        layout,
        op_s,
        op_a,
        d,
        n,
        m,
        alpha,
        &buff[pos..],
        lds,
        a,
        lda,
        beta,
        b,
        ldb,
    )
}

/// Sketch from the right: `B := alpha * op(A) * op(submat(S)) + beta * B`
///
/// `op(A)` is `m x n`, `op(submat(S))` is `n x d`, and `B` is `m x d`. The
/// operator sub-block starts at `(row_offset, col_offset)` of `S`'s parent
/// matrix. `A` and `B` are stored in `layout` with leading dimensions `lda`
/// and `ldb`.
///
/// Mirrors [`sketch_general_left`], including just-in-time synthesis of the
/// addressed sub-block when `S` is unmaterialized.
///
/// # Errors
///
/// Same conditions as [`sketch_general_left`].
#[allow(clippy::too_many_arguments)]
pub fn sketch_general_right<T, G>(
    layout: Layout,
    op_a: Op,
    op_s: Op,
    m: usize,
    d: usize,
    n: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    s: &DenseSkOp<'_, T, G>,
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
    check_submatrix(
        s.dist().n_rows,
        s.dist().n_cols,
        row_offset,
        col_offset,
        rows_s,
        cols_s,
    )?;

    let buff = match s.buffer() {
        Some(buff) => buff,
        None => {
            debug!(
                "synthesizing {}x{} sub-block at ({}, {}) for right sketch",
                rows_s, cols_s, row_offset, col_offset
            );
            let mut scratch = vec![T::zero(); rows_s * cols_s];
            fill_dense_submat::<T, G>(
                s.dist(),
                &mut scratch,
                rows_s,
                cols_s,
                row_offset,
                col_offset,
                s.seed_state(),
            )?;
            let sub_dist = DenseDist::with_major_axis(
                rows_s,
                cols_s,
                DenseDistName::BlackBox,
                axis_for_layout(rows_s, cols_s, s.layout()),
            );
            let sub = DenseSkOp::<T, G>::with_buffer(sub_dist, s.seed_state(), &scratch)?;
            return sketch_general_right(
                layout, op_a, op_s, m, d, n, alpha, a, lda, &sub, 0, 0, beta, b, ldb,
            );
        }
    };

    let (pos, lds) = offset_and_ldim(
        s.layout(),
        s.dist().n_rows,
        s.dist().n_cols,
        row_offset,
        col_offset,
    );
    let op_s = if s.layout() == layout {
        op_s
    } else {
        op_s.flipped()
    };
    gemm(
        layout,
        op_a,
        op_s,
        m,
        d,
        n,
        alpha,
        a,
        lda,
        &buff[pos..],
        lds,
        beta,
        b,
        ldb,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RngState;

    fn gaussian_op(n_rows: usize, n_cols: usize, key: u32) -> DenseSkOp<'static, f64> {
        let dist = DenseDist::new(n_rows, n_cols, DenseDistName::Gaussian);
        DenseSkOp::new(dist, RngState::from_key(key)).unwrap()
    }

    #[test]
    fn test_left_sketch_matches_materialized() {
        // Applying an unmaterialized operator must agree with realizing it
        // first and applying the buffer.
        let (d, m, n) = (5usize, 9usize, 4usize);
        let a: Vec<f64> = (0..m * n).map(|i| (i as f64) * 0.25 - 3.0).collect();

        let lazy = gaussian_op(d, m, 17);
        let mut b_lazy = vec![0.0; d * n];
        sketch_general_left(
            Layout::RowMajor,
            Op::NoTrans,
            Op::NoTrans,
            d,
            n,
            m,
            1.0,
            &lazy,
            0,
            0,
            &a,
            n,
            0.0,
            &mut b_lazy,
            n,
        )
        .unwrap();

        let mut eager = gaussian_op(d, m, 17);
        eager.realize().unwrap();
        let mut b_eager = vec![0.0; d * n];
        sketch_general_left(
            Layout::RowMajor,
            Op::NoTrans,
            Op::NoTrans,
            d,
            n,
            m,
            1.0,
            &eager,
            0,
            0,
            &a,
            n,
            0.0,
            &mut b_eager,
            n,
        )
        .unwrap();

        assert_eq!(b_lazy, b_eager);
    }

    #[test]
    fn test_left_submatrix_agrees_with_slice() {
        // Sketching with a sub-block of S equals slicing the realized parent.
        let (pd, pm) = (8usize, 12usize);
        let (d, m, n) = (3usize, 5usize, 4usize);
        let (ro, co) = (2usize, 6usize);
        let a: Vec<f64> = (0..m * n).map(|i| ((i * 7 % 13) as f64) - 6.0).collect();

        let lazy = gaussian_op(pd, pm, 3);
        let mut b_sub = vec![0.0; d * n];
        sketch_general_left(
            Layout::RowMajor,
            Op::NoTrans,
            Op::NoTrans,
            d,
            n,
            m,
            1.0,
            &lazy,
            ro,
            co,
            &a,
            n,
            0.0,
            &mut b_sub,
            n,
        )
        .unwrap();

        let mut parent = gaussian_op(pd, pm, 3);
        parent.realize().unwrap();
        // parent is wide long-major, so its buffer is row-major
        let buff = parent.buffer().unwrap();
        let mut b_ref = vec![0.0; d * n];
        for i in 0..d {
            for j in 0..n {
                let mut acc = 0.0;
                for p in 0..m {
                    acc += buff[(ro + i) * pm + (co + p)] * a[p * n + j];
                }
                b_ref[i * n + j] = acc;
            }
        }
        for (x, y) in b_sub.iter().zip(b_ref.iter()) {
            assert!((x - y).abs() < 1e-12, "{} vs {}", x, y);
        }
    }

    #[test]
    fn test_left_layout_flip_transpose() {
        // S is wide long-major (row-major buffer); applying it under a
        // col-major caller layout exercises the layout-flip path.
        let (d, m, n) = (4usize, 6usize, 3usize);
        let a_rm: Vec<f64> = (0..m * n).map(|i| (i as f64) * 0.5).collect();
        // Same logical A in col-major storage.
        let mut a_cm = vec![0.0; m * n];
        for i in 0..m {
            for j in 0..n {
                a_cm[i + j * m] = a_rm[i * n + j];
            }
        }

        let s = gaussian_op(d, m, 8);
        let mut b_rm = vec![0.0; d * n];
        sketch_general_left(
            Layout::RowMajor,
            Op::NoTrans,
            Op::NoTrans,
            d,
            n,
            m,
            1.0,
            &s,
            0,
            0,
            &a_rm,
            n,
            0.0,
            &mut b_rm,
            n,
        )
        .unwrap();

        let mut b_cm = vec![0.0; d * n];
        sketch_general_left(
            Layout::ColMajor,
            Op::NoTrans,
            Op::NoTrans,
            d,
            n,
            m,
            1.0,
            &s,
            0,
            0,
            &a_cm,
            m,
            0.0,
            &mut b_cm,
            d,
        )
        .unwrap();

        for i in 0..d {
            for j in 0..n {
                let (x, y) = (b_rm[i * n + j], b_cm[i + j * d]);
                assert!((x - y).abs() < 1e-12, "{} vs {}", x, y);
            }
        }
    }

    #[test]
    fn test_right_sketch_matches_left_transposed() {
        // (A * op(S))^T = op(S)^T * A^T links the two entry points.
        let (m, n, d) = (4usize, 7usize, 3usize);
        let a: Vec<f64> = (0..m * n).map(|i| ((i % 11) as f64) - 5.0).collect();
        let s = gaussian_op(n, d, 21);

        let mut b_right = vec![0.0; m * d];
        sketch_general_right(
            Layout::RowMajor,
            Op::NoTrans,
            Op::NoTrans,
            m,
            d,
            n,
            1.0,
            &a,
            n,
            &s,
            0,
            0,
            0.0,
            &mut b_right,
            d,
        )
        .unwrap();

        // Left sketch producing B^T: op(S)^T is d x n applied to A^T (n x m).
        let mut a_t = vec![0.0; m * n];
        for i in 0..m {
            for j in 0..n {
                a_t[j * m + i] = a[i * n + j];
            }
        }
        let mut bt = vec![0.0; d * m];
        sketch_general_left(
            Layout::RowMajor,
            Op::Trans,
            Op::NoTrans,
            d,
            m,
            n,
            1.0,
            &s,
            0,
            0,
            &a_t,
            m,
            0.0,
            &mut bt,
            m,
        )
        .unwrap();

        for i in 0..m {
            for q in 0..d {
                let (x, y) = (b_right[i * d + q], bt[q * m + i]);
                assert!((x - y).abs() < 1e-12, "{} vs {}", x, y);
            }
        }
    }

    #[test]
    fn test_left_rejects_out_of_bounds_submatrix() {
        let s = gaussian_op(4, 6, 0);
        let a = vec![0.0; 6 * 2];
        let mut b = vec![0.0; 4 * 2];
        let err = sketch_general_left(
            Layout::RowMajor,
            Op::NoTrans,
            Op::NoTrans,
            4,
            2,
            6,
            1.0,
            &s,
            1,
            1,
            &a,
            2,
            0.0,
            &mut b,
            2,
        )
        .unwrap_err();
        assert!(matches!(err, Error::SubmatrixOutOfBounds { .. }));
    }
}
