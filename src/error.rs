//! Error types for sketchmat

use thiserror::Error;

/// Result type alias using sketchmat's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sketchmat operations
///
/// Every variant is a caller bug detected before any output is mutated:
/// all inputs are in-memory and deterministic, so nothing here is retryable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A dimension that must be strictly positive was not
    #[error("Dimension '{name}' must be positive, got {value}")]
    NonPositiveDimension {
        /// The dimension name
        name: &'static str,
        /// The offending value
        value: i64,
    },

    /// A sub-block does not lie within its parent operator
    #[error(
        "Submatrix out of bounds: offset ({row_offset}, {col_offset}) with shape \
         {n_sub_rows}x{n_sub_cols} exceeds parent {n_rows}x{n_cols}"
    )]
    SubmatrixOutOfBounds {
        /// Parent row count
        n_rows: usize,
        /// Parent column count
        n_cols: usize,
        /// Sub-block row offset
        row_offset: usize,
        /// Sub-block column offset
        col_offset: usize,
        /// Sub-block row count
        n_sub_rows: usize,
        /// Sub-block column count
        n_sub_cols: usize,
    },

    /// A leading dimension is too small for the matrix it addresses
    #[error("Leading dimension '{name}' = {ld} is smaller than required minimum {min}")]
    InsufficientLeadingDim {
        /// The argument name
        name: &'static str,
        /// The supplied leading dimension
        ld: usize,
        /// The minimum legal value
        min: usize,
    },

    /// A buffer is smaller than the operation requires
    #[error("Buffer '{name}' holds {got} elements but {required} are required")]
    BufferTooSmall {
        /// The argument name
        name: &'static str,
        /// Elements required
        required: usize,
        /// Elements supplied
        got: usize,
    },

    /// Sparsity target exceeds the axis it samples from
    #[error("vec_nnz = {vec_nnz} exceeds major axis length {major_len}")]
    SparsityExceedsAxis {
        /// Requested nonzeros per vector
        vec_nnz: usize,
        /// Length of the sampled axis
        major_len: usize,
    },

    /// A sub-block row is longer than the parent's major-axis vectors
    #[error("sub-block rows of length {row_len} exceed parent major length {major_len}")]
    RowExceedsMajorLen {
        /// Elements per sub-block row
        row_len: usize,
        /// Elements per parent major-axis vector
        major_len: usize,
    },

    /// Coordinate arrays of a sparse matrix disagree in length
    #[error("coordinate arrays disagree in length: rows = {rows}, cols = {cols}, vals = {vals}")]
    CoordinateArraysMismatch {
        /// Length of the row-index array
        rows: usize,
        /// Length of the column-index array
        cols: usize,
        /// Length of the value array
        vals: usize,
    },

    /// A stored coordinate lies outside its matrix's shape
    #[error("coordinate ({row}, {col}) outside {n_rows}x{n_cols} matrix")]
    CoordinateOutOfBounds {
        /// Row index of the offending entry
        row: i64,
        /// Column index of the offending entry
        col: i64,
        /// Number of rows in the matrix
        n_rows: usize,
        /// Number of columns in the matrix
        n_cols: usize,
    },

    /// Operation is not defined for this distribution or operator state
    #[error("Unsupported operation '{op}': {reason}")]
    Unsupported {
        /// The operation name
        op: &'static str,
        /// Why it is not allowed
        reason: &'static str,
    },
}

impl Error {
    /// Check that a dimension is strictly positive
    pub fn require_positive(name: &'static str, value: usize) -> Result<()> {
        if value == 0 {
            return Err(Error::NonPositiveDimension { name, value: 0 });
        }
        Ok(())
    }

    /// Check that a leading dimension meets its minimum
    pub fn require_ld(name: &'static str, ld: usize, min: usize) -> Result<()> {
        if ld < min {
            return Err(Error::InsufficientLeadingDim { name, ld, min });
        }
        Ok(())
    }

    /// Check that a buffer holds at least `required` elements
    pub fn require_len(name: &'static str, got: usize, required: usize) -> Result<()> {
        if got < required {
            return Err(Error::BufferTooSmall {
                name,
                required,
                got,
            });
        }
        Ok(())
    }
}
