//! Matrix-shaped view of a vector trajectory.
//!
//! A simulation of a vector-form system yields samples of a flat state vector whose
//! column order is the *unraveled order*. [`MatrixTrajectory`] puts those samples
//! back into the shape of a *raveled layout*: a matrix of symbols taken from the
//! unraveled order, repeats allowed (a symmetric state matrix repeats every
//! off-diagonal unknown). Each cell is resolved by searching its symbol in the
//! unraveled order, never by position, so the two must come from the same model.
use crate::matrices::matrix_errors::MatrixError;
use crate::matrices::trajectory::{InterpolationKind, TrajectoryInterpolant};
use crate::symbolic::symbolic_engine::Symbol;
use crate::symbolic::symbolic_vectors::ExprMatrix;
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use ndarray::Array3;

/// Symbols in the column order of the vector samples.
#[derive(Clone, Debug, PartialEq)]
pub struct UnraveledOrder(Vec<Symbol>);

impl UnraveledOrder {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }

    /// Row-major flattening of a matrix of symbols.
    pub fn from_matrix(matrix: &ExprMatrix) -> Result<Self, MatrixError> {
        let symbols = matrix
            .cells()
            .map(|((i, j), e)| {
                e.as_symbol().cloned().ok_or_else(|| MatrixError::NotASymbol {
                    entry: e.to_string(),
                    row: i,
                    col: j,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(symbols))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    /// Flat index of `symbol`, first occurrence.
    pub fn index_of(&self, symbol: &Symbol) -> Option<usize> {
        self.0.iter().position(|s| s == symbol)
    }
}

impl From<Vec<Symbol>> for UnraveledOrder {
    fn from(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }
}

/// Time argument of [`MatrixTrajectory::matrix_at`].
#[derive(Clone, Copy, Debug)]
pub enum TimeArg<'a> {
    /// one time, one matrix
    Scalar(f64),
    /// several times stacked along the first axis; a single time collapses to
    /// [`MatrixSample::Single`]
    Batch(&'a [f64]),
    /// several times, always stacked, even when there is only one
    Stacked(&'a [f64]),
}

/// Result of [`MatrixTrajectory::matrix_at`].
#[derive(Clone, Debug, PartialEq)]
pub enum MatrixSample {
    /// `p × q` matrix at one time
    Single(DMatrix<f64>),
    /// `k × p × q` stack, one matrix per requested time
    Batch(Array3<f64>),
}

impl MatrixSample {
    pub fn single(self) -> Option<DMatrix<f64>> {
        match self {
            MatrixSample::Single(m) => Some(m),
            MatrixSample::Batch(_) => None,
        }
    }

    pub fn batch(self) -> Option<Array3<f64>> {
        match self {
            MatrixSample::Batch(a) => Some(a),
            MatrixSample::Single(_) => None,
        }
    }
}

/// Callable that evaluates a matrix-shaped trajectory at arbitrary times.
pub struct MatrixTrajectory {
    vector_callable: TrajectoryInterpolant,
    unraveled: UnraveledOrder,
    raveled: ExprMatrix,
}

impl MatrixTrajectory {
    pub fn new(
        tt: &DVector<f64>,
        x: &DMatrix<f64>,
        unraveled: UnraveledOrder,
        raveled: ExprMatrix,
        kind: InterpolationKind,
    ) -> Result<Self, MatrixError> {
        if x.ncols() != unraveled.len() {
            return Err(MatrixError::DimensionMismatch {
                context: "sample columns vs unraveled order".to_string(),
                expected: (x.nrows(), unraveled.len()),
                found: x.shape(),
            });
        }
        let vector_callable = TrajectoryInterpolant::new(tt, x, kind)?;
        info!(
            "matrix trajectory {:?} over {} channels and {} samples",
            raveled.shape(),
            unraveled.len(),
            tt.len()
        );
        Ok(Self {
            vector_callable,
            unraveled,
            raveled,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.raveled.shape()
    }

    pub fn unraveled(&self) -> &UnraveledOrder {
        &self.unraveled
    }

    pub fn raveled(&self) -> &ExprMatrix {
        &self.raveled
    }

    /// Column of the vector samples feeding each cell of the raveled layout.
    ///
    /// `matrix_at` redoes this search on every call; callers evaluating many times
    /// can keep this table instead.
    pub fn column_indices(&self) -> Result<Vec<Vec<usize>>, MatrixError> {
        let (p, q) = self.raveled.shape();
        let mut table = vec![vec![0; q]; p];
        for ((i, j), entry) in self.raveled.cells() {
            table[i][j] = self.lookup(i, j, entry.as_symbol())?;
        }
        Ok(table)
    }

    fn lookup(&self, i: usize, j: usize, symbol: Option<&Symbol>) -> Result<usize, MatrixError> {
        symbol
            .and_then(|s| self.unraveled.index_of(s))
            .ok_or_else(|| MatrixError::SymbolNotFound {
                symbol: self.raveled[(i, j)].to_string(),
                row: i,
                col: j,
            })
    }

    /// Evaluates the matrix trajectory.
    ///
    /// `Scalar` gives a `p × q` matrix. `Batch` gives a `k × p × q` array, except
    /// that a batch of exactly one time is returned as a single matrix. `Stacked`
    /// always returns the `k × p × q` array.
    pub fn matrix_at(&self, t: TimeArg<'_>) -> Result<MatrixSample, MatrixError> {
        match t {
            TimeArg::Scalar(time) => self.single(time).map(MatrixSample::Single),
            TimeArg::Batch(times) if times.len() == 1 => {
                debug!("batch of one time collapsed to a single matrix");
                self.single(times[0]).map(MatrixSample::Single)
            }
            TimeArg::Batch(times) | TimeArg::Stacked(times) => {
                self.stacked(times).map(MatrixSample::Batch)
            }
        }
    }

    fn single(&self, time: f64) -> Result<DMatrix<f64>, MatrixError> {
        let vector_result = self.vector_callable.eval(time)?;
        let (p, q) = self.raveled.shape();
        let mut matrix_result = DMatrix::zeros(p, q);
        for ((i, j), entry) in self.raveled.cells() {
            let idx = self.lookup(i, j, entry.as_symbol())?;
            matrix_result[(i, j)] = vector_result[idx];
        }
        Ok(matrix_result)
    }

    fn stacked(&self, times: &[f64]) -> Result<Array3<f64>, MatrixError> {
        let vector_result = self.vector_callable.eval_many(times)?;
        let (p, q) = self.raveled.shape();
        let mut matrix_result = Array3::zeros((times.len(), p, q));
        for ((i, j), entry) in self.raveled.cells() {
            let idx = self.lookup(i, j, entry.as_symbol())?;
            for k in 0..times.len() {
                matrix_result[[k, i, j]] = vector_result[(k, idx)];
            }
        }
        Ok(matrix_result)
    }
}

/// Interpolating matrix callable from a vector trajectory (linear interpolation).
///
/// * `tt` - m time indices
/// * `x` - m × n samples, column `c` belonging to `unraveled[c]`
/// * `unraveled` - symbols in the column order of `x`
/// * `raveled` - matrix of symbols in the desired positions
pub fn matrix_callable_from_vector_trajectory(
    tt: &DVector<f64>,
    x: &DMatrix<f64>,
    unraveled: impl Into<UnraveledOrder>,
    raveled: &ExprMatrix,
) -> Result<MatrixTrajectory, MatrixError> {
    MatrixTrajectory::new(
        tt,
        x,
        unraveled.into(),
        raveled.clone(),
        InterpolationKind::default(),
    )
}
