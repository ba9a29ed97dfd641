//! GEMM-style sketch application
//!
//! Entry points for `B := alpha * op(S) * op(A) + beta * B` (and the
//! right-multiplied mirror image), where `S` is a possibly-unmaterialized
//! sketching operator and `A`, `B` are dense matrices addressed through the
//! BLAS layout / leading-dimension convention.
//!
//! Dense operators never need to be materialized in full: when an
//! unmaterialized operator is applied, only the sub-block the caller actually
//! addressed is synthesized, and that sub-block is bit-identical to the
//! corresponding slice of a whole-operator fill.

mod dense_apply;
mod sparse_apply;

pub use dense_apply::{sketch_general_left, sketch_general_right};
pub use sparse_apply::{sketch_sparse_left, sketch_sparse_right};

use crate::base::{Layout, MajorAxis};

/// Pick the major axis under which an `n_rows x n_cols` distribution has
/// storage layout `layout`
///
/// Used when wrapping a synthesized sub-block as a buffer-backed operator:
/// the sub-block inherits its parent's layout, which the sub-shape alone does
/// not determine.
pub(crate) fn axis_for_layout(n_rows: usize, n_cols: usize, layout: Layout) -> MajorAxis {
    let is_wide = n_rows < n_cols;
    let row_major = layout == Layout::RowMajor;
    // layout() is RowMajor iff is_wide == is_long
    if is_wide == row_major {
        MajorAxis::Long
    } else {
        MajorAxis::Short
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::{DenseDist, DenseDistName};

    #[test]
    fn test_axis_for_layout_round_trips() {
        for (r, c) in [(3usize, 10usize), (10, 3), (4, 4)] {
            for layout in [Layout::RowMajor, Layout::ColMajor] {
                let axis = axis_for_layout(r, c, layout);
                let dist = DenseDist::with_major_axis(r, c, DenseDistName::BlackBox, axis);
                assert_eq!(dist.layout(), layout, "shape {}x{}", r, c);
            }
        }
    }
}
