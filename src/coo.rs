//! Borrowed coordinate-format matrix views
//!
//! A [`CooMatrix`] is a read-only `(rows, cols, vals)` triple over storage
//! owned elsewhere, typically a sparse sketching operator. Nothing here
//! deduplicates or sorts; entries are consumed in storage order.

use crate::base::Layout;
use crate::dtype::Scalar;
use crate::error::{Error, Result};

/// Read-only coordinate view of a sparse matrix
#[derive(Debug, Clone, Copy)]
pub struct CooMatrix<'a, T> {
    /// Number of rows
    pub n_rows: usize,
    /// Number of columns
    pub n_cols: usize,
    /// Row index of each stored entry
    pub rows: &'a [i64],
    /// Column index of each stored entry
    pub cols: &'a [i64],
    /// Value of each stored entry
    pub vals: &'a [T],
}

impl<'a, T: Scalar> CooMatrix<'a, T> {
    /// Create a view, checking that the three arrays agree in length and
    /// every index lies within the stated shape
    pub fn new(
        n_rows: usize,
        n_cols: usize,
        rows: &'a [i64],
        cols: &'a [i64],
        vals: &'a [T],
    ) -> Result<Self> {
        Error::require_positive("n_rows", n_rows)?;
        Error::require_positive("n_cols", n_cols)?;
        if rows.len() != vals.len() || cols.len() != vals.len() {
            return Err(Error::CoordinateArraysMismatch {
                rows: rows.len(),
                cols: cols.len(),
                vals: vals.len(),
            });
        }
        for (&i, &j) in rows.iter().zip(cols.iter()) {
            if i < 0 || j < 0 || i as usize >= n_rows || j as usize >= n_cols {
                return Err(Error::CoordinateOutOfBounds {
                    row: i,
                    col: j,
                    n_rows,
                    n_cols,
                });
            }
        }
        Ok(Self {
            n_rows,
            n_cols,
            rows,
            cols,
            vals,
        })
    }

    /// Number of stored entries
    #[inline]
    pub fn nnz(&self) -> usize {
        self.vals.len()
    }

    /// The transposed view, sharing this view's storage
    #[inline]
    pub fn transposed(&self) -> CooMatrix<'a, T> {
        CooMatrix {
            n_rows: self.n_cols,
            n_cols: self.n_rows,
            rows: self.cols,
            cols: self.rows,
            vals: self.vals,
        }
    }
}

/// Scatter a coordinate view into a dense buffer
///
/// `out` receives the full `n_rows x n_cols` matrix in `layout` with the
/// minimal leading dimension. Unset positions become zero; duplicate
/// coordinates accumulate.
pub fn coo_to_dense<T: Scalar>(coo: &CooMatrix<'_, T>, layout: Layout, out: &mut [T]) -> Result<()> {
    Error::require_len("out", out.len(), coo.n_rows * coo.n_cols)?;
    for v in out[..coo.n_rows * coo.n_cols].iter_mut() {
        *v = T::zero();
    }
    for ((&i, &j), &v) in coo.rows.iter().zip(coo.cols.iter()).zip(coo.vals.iter()) {
        let (i, j) = (i as usize, j as usize);
        let at = match layout {
            Layout::RowMajor => i * coo.n_cols + j,
            Layout::ColMajor => i + j * coo.n_rows,
        };
        out[at] = out[at] + v;
    }
    Ok(())
}
