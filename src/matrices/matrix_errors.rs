//! Error type shared by the symbolic matrix helpers, the trajectory reconstruction
//! and the matrix-DE conversion.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    /// Requested structure cannot be built with the given row/column counts.
    #[error("cannot make a {structure} matrix with {nrows} rows and {ncols} columns")]
    InvalidShape {
        structure: String,
        nrows: usize,
        ncols: usize,
    },

    /// Matrices that have to be joined or paired have incompatible shapes.
    #[error("dimension mismatch in {context}: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        context: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// A raveled-layout symbol has no column in the unraveled order.
    #[error("symbol {symbol} at ({row}, {col}) is not in the unraveled order")]
    SymbolNotFound {
        symbol: String,
        row: usize,
        col: usize,
    },

    /// Derivative and state matrices differ in shape.
    #[error("derivative matrix is {de_shape:?} but state matrix is {var_shape:?}")]
    ShapeMismatch {
        de_shape: (usize, usize),
        var_shape: (usize, usize),
    },

    /// An entry that has to be a bare symbol holds something else.
    #[error("entry ({row}, {col}) = {entry} is neither a symbol nor a structural zero")]
    NotASymbol {
        entry: String,
        row: usize,
        col: usize,
    },

    /// Evaluation met a free symbol that was given no value.
    #[error("symbol {symbol} has no value")]
    UnboundSymbol { symbol: String },

    /// A symbol given more than one argument slot, or the slot of the time variable.
    #[error("symbol {symbol} appears more than once among [t, state, input]")]
    DuplicateArgument { symbol: String },

    /// A trajectory without a single sample cannot be interpolated.
    #[error("trajectory has no samples")]
    EmptyTrajectory,

    /// Interpolation only accepts finite time values.
    #[error("time value {time} is not finite")]
    NonFiniteTime { time: f64 },
}
