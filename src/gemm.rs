//! Dense multiply-accumulate backend
//!
//! A GEMM kernel following the BLAS layout / leading-dimension addressing
//! convention. The sketch dispatcher consumes this as its numerical backend:
//! it computes pointers, leading dimensions, and transpose flags, and
//! delegates all arithmetic here.

use crate::base::{dims_before_op, Layout, Op};
use crate::dtype::Scalar;
use crate::error::{Error, Result};

/// Row and column strides of a stored matrix under `layout` with leading
/// dimension `ld`
#[inline]
pub(crate) fn strides(layout: Layout, ld: usize) -> (usize, usize) {
    match layout {
        Layout::RowMajor => (ld, 1),
        Layout::ColMajor => (1, ld),
    }
}

/// Minimum legal leading dimension for a stored `rows x cols` matrix
#[inline]
pub(crate) fn min_ld(layout: Layout, rows: usize, cols: usize) -> usize {
    match layout {
        Layout::RowMajor => cols,
        Layout::ColMajor => rows,
    }
}

/// Elements a buffer must hold for a stored `rows x cols` matrix with
/// leading dimension `ld`
#[inline]
pub(crate) fn required_len(layout: Layout, rows: usize, cols: usize, ld: usize) -> usize {
    if rows == 0 || cols == 0 {
        return 0;
    }
    match layout {
        Layout::RowMajor => ld * (rows - 1) + cols,
        Layout::ColMajor => ld * (cols - 1) + rows,
    }
}

/// General matrix multiply-accumulate: `C := alpha * op(A) * op(B) + beta * C`
///
/// `op(A)` is `m x k`, `op(B)` is `k x n`, and `C` is `m x n`. All three
/// matrices are stored in `layout` with leading dimensions `lda`, `ldb`,
/// `ldc`.
///
/// # Errors
///
/// Returns an error if a dimension is zero, a leading dimension is below its
/// minimum, or a buffer is too small for the shape it addresses.
#[allow(clippy::too_many_arguments)]
pub fn gemm<T: Scalar>(
    layout: Layout,
    op_a: Op,
    op_b: Op,
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    b: &[T],
    ldb: usize,
    beta: T,
    c: &mut [T],
    ldc: usize,
) -> Result<()> {
    Error::require_positive("m", m)?;
    Error::require_positive("n", n)?;
    Error::require_positive("k", k)?;

    let (rows_a, cols_a) = dims_before_op(m, k, op_a);
    let (rows_b, cols_b) = dims_before_op(k, n, op_b);
    Error::require_ld("lda", lda, min_ld(layout, rows_a, cols_a))?;
    Error::require_ld("ldb", ldb, min_ld(layout, rows_b, cols_b))?;
    Error::require_ld("ldc", ldc, min_ld(layout, m, n))?;
    Error::require_len("a", a.len(), required_len(layout, rows_a, cols_a, lda))?;
    Error::require_len("b", b.len(), required_len(layout, rows_b, cols_b, ldb))?;
    Error::require_len("c", c.len(), required_len(layout, m, n, ldc))?;

    // Strides of op(A) over (i, p) and op(B) over (p, j).
    let (a_rs, a_cs) = strides(layout, lda);
    let (a_is, a_ps) = match op_a {
        Op::NoTrans => (a_rs, a_cs),
        Op::Trans => (a_cs, a_rs),
    };
    let (b_rs, b_cs) = strides(layout, ldb);
    let (b_ps, b_js) = match op_b {
        Op::NoTrans => (b_rs, b_cs),
        Op::Trans => (b_cs, b_rs),
    };
    let (c_is, c_js) = strides(layout, ldc);

    // Scale (or clear) C first, then accumulate in ikj order for cache
    // locality on op(B) rows.
    for i in 0..m {
        for j in 0..n {
            let cv = &mut c[i * c_is + j * c_js];
            *cv = if beta == T::zero() {
                T::zero()
            } else {
                beta * *cv
            };
        }
    }
    if alpha == T::zero() {
        return Ok(());
    }
    for i in 0..m {
        for p in 0..k {
            let av = alpha * a[i * a_is + p * a_ps];
            for j in 0..n {
                c[i * c_is + j * c_js] = c[i * c_is + j * c_js] + av * b[p * b_ps + j * b_js];
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemm_identity() {
        // A * I = A
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]; // 2x3 row-major
        let eye = vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        let mut c = vec![0.0; 6];
        gemm(
            Layout::RowMajor,
            Op::NoTrans,
            Op::NoTrans,
            2,
            3,
            3,
            1.0,
            &a,
            3,
            &eye,
            3,
            0.0,
            &mut c,
            3,
        )
        .unwrap();
        assert_eq!(c, a);
    }

    #[test]
    fn test_gemm_trans_and_layout_agree() {
        // Row-major A*B equals col-major computed on the same logical matrices.
        let a = vec![1.0, 2.0, 3.0, 4.0]; // 2x2 row-major
        let b = vec![5.0, 6.0, 7.0, 8.0]; // 2x2 row-major
        let mut c_rm = vec![0.0; 4];
        gemm(
            Layout::RowMajor,
            Op::NoTrans,
            Op::NoTrans,
            2,
            2,
            2,
            1.0,
            &a,
            2,
            &b,
            2,
            0.0,
            &mut c_rm,
            2,
        )
        .unwrap();

        // Same bytes reinterpreted: row-major X is col-major X^T.
        let mut c_cm = vec![0.0; 4];
        gemm(
            Layout::ColMajor,
            Op::Trans,
            Op::Trans,
            2,
            2,
            2,
            1.0,
            &a,
            2,
            &b,
            2,
            0.0,
            &mut c_cm,
            2,
        )
        .unwrap();
        // c_cm holds (A*B)^T in col-major, i.e. A*B in row-major.
        assert_eq!(c_rm, c_cm);
    }

    #[test]
    fn test_gemm_alpha_beta() {
        let a = vec![1.0, 0.0, 0.0, 1.0]; // I, 2x2
        let b = vec![1.0, 2.0, 3.0, 4.0];
        let mut c = vec![10.0, 10.0, 10.0, 10.0];
        gemm(
            Layout::RowMajor,
            Op::NoTrans,
            Op::NoTrans,
            2,
            2,
            2,
            2.0,
            &a,
            2,
            &b,
            2,
            0.5,
            &mut c,
            2,
        )
        .unwrap();
        assert_eq!(c, vec![7.0, 9.0, 11.0, 13.0]);
    }

    #[test]
    fn test_gemm_rejects_bad_ld() {
        let a = vec![0.0; 4];
        let b = vec![0.0; 4];
        let mut c = vec![0.0; 4];
        let err = gemm(
            Layout::RowMajor,
            Op::NoTrans,
            Op::NoTrans,
            2,
            2,
            2,
            1.0,
            &a,
            1,
            &b,
            2,
            0.0,
            &mut c,
            2,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InsufficientLeadingDim { .. }));
    }

    #[test]
    fn test_gemm_rejects_zero_dim() {
        let a = vec![0.0; 4];
        let b = vec![0.0; 4];
        let mut c = vec![0.0; 4];
        let err = gemm(
            Layout::RowMajor,
            Op::NoTrans,
            Op::NoTrans,
            0,
            2,
            2,
            1.0,
            &a,
            2,
            &b,
            2,
            0.0,
            &mut c,
            2,
        )
        .unwrap_err();
        assert!(matches!(err, Error::NonPositiveDimension { .. }));
    }
}
