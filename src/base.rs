//! Shared enums and matrix addressing helpers
//!
//! Everything here follows the BLAS convention: a matrix is addressed through
//! a base pointer, a storage layout, and a leading dimension measured in
//! elements.

use crate::error::{Error, Result};

/// Storage order of a matrix in a flat buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Element (i, j) lives at `i * ld + j`
    RowMajor,
    /// Element (i, j) lives at `i + j * ld`
    ColMajor,
}

impl Layout {
    /// The opposite storage order
    #[inline]
    pub fn flipped(self) -> Layout {
        match self {
            Layout::RowMajor => Layout::ColMajor,
            Layout::ColMajor => Layout::RowMajor,
        }
    }
}

/// Whether an operand enters a product as itself or transposed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// op(X) = X
    NoTrans,
    /// op(X) = X^T
    Trans,
}

impl Op {
    /// The opposite transpose flag
    #[inline]
    pub fn flipped(self) -> Op {
        match self {
            Op::NoTrans => Op::Trans,
            Op::Trans => Op::NoTrans,
        }
    }
}

/// Which axis of an operator controls its sampling schedule
///
/// For a sparse operator, sparsity is fixed per major-axis vector. For a dense
/// operator, the major axis determines the order in which the buffer is swept
/// during generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MajorAxis {
    /// Short-axis vectors (columns of a wide matrix, rows of a tall matrix)
    Short,
    /// Long-axis vectors (rows of a wide matrix, columns of a tall matrix)
    Long,
}

/// Dimensions of an operand *before* `op` is applied
///
/// If `op(X)` is `rows x cols`, returns the shape of `X` itself.
#[inline]
pub fn dims_before_op(rows: usize, cols: usize, op: Op) -> (usize, usize) {
    match op {
        Op::NoTrans => (rows, cols),
        Op::Trans => (cols, rows),
    }
}

/// Linear offset of a sub-block's first element, and the leading dimension,
/// for a parent matrix of shape `n_rows x n_cols` stored in `layout`
#[inline]
pub fn offset_and_ldim(
    layout: Layout,
    n_rows: usize,
    n_cols: usize,
    row_offset: usize,
    col_offset: usize,
) -> (usize, usize) {
    match layout {
        Layout::ColMajor => (row_offset + n_rows * col_offset, n_rows),
        Layout::RowMajor => (row_offset * n_cols + col_offset, n_cols),
    }
}

/// Validate that a sub-block lies fully within its parent
pub fn check_submatrix(
    n_rows: usize,
    n_cols: usize,
    row_offset: usize,
    col_offset: usize,
    n_sub_rows: usize,
    n_sub_cols: usize,
) -> Result<()> {
    if row_offset + n_sub_rows > n_rows || col_offset + n_sub_cols > n_cols {
        return Err(Error::SubmatrixOutOfBounds {
            n_rows,
            n_cols,
            row_offset,
            col_offset,
            n_sub_rows,
            n_sub_cols,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_ldim() {
        assert_eq!(offset_and_ldim(Layout::ColMajor, 10, 4, 2, 3), (32, 10));
        assert_eq!(offset_and_ldim(Layout::RowMajor, 10, 4, 2, 3), (11, 4));
    }

    #[test]
    fn test_dims_before_op() {
        assert_eq!(dims_before_op(3, 7, Op::NoTrans), (3, 7));
        assert_eq!(dims_before_op(3, 7, Op::Trans), (7, 3));
    }

    #[test]
    fn test_check_submatrix_bounds() {
        assert!(check_submatrix(10, 10, 2, 2, 8, 8).is_ok());
        assert!(check_submatrix(10, 10, 3, 0, 8, 8).is_err());
        assert!(check_submatrix(10, 10, 0, 5, 10, 6).is_err());
    }
}
