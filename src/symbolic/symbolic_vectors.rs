use crate::matrices::matrix_errors::MatrixError;
use crate::symbolic::symbolic_engine::{Expr, Symbol};

use nalgebra::{DMatrix, DVector};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::{Index, IndexMut};

#[derive(Clone, Debug, PartialEq)]
/// Symbolic vector
pub struct ExprVector {
    pub data: Vec<Expr>,
}

impl ExprVector {
    /// Create new symbolic vector
    pub fn new(data: Vec<Expr>) -> Self {
        Self { data }
    }

    /// Create zero vector of given size
    pub fn zeros(size: usize) -> Self {
        Self {
            data: vec![Expr::Const(0.0); size],
        }
    }

    /// Vector of bare symbols
    pub fn from_symbols(symbols: &[Symbol]) -> Self {
        Self {
            data: symbols.iter().map(Symbol::to_expr).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expr> {
        self.data.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Expr> {
        self.data.get(index)
    }

    pub fn push(&mut self, expr: Expr) {
        self.data.push(expr);
    }

    /// Substitute symbols
    pub fn subs(&self, map: &HashMap<Symbol, Expr>) -> ExprVector {
        ExprVector::new(self.data.iter().map(|expr| expr.subs(map)).collect())
    }

    /// Differentiate with respect to a symbol
    pub fn diff(&self, var: &Symbol) -> ExprVector {
        ExprVector::new(self.data.iter().map(|expr| expr.diff(var)).collect())
    }

    /// Jacobian matrix d(self_i)/d(vars_j)
    pub fn jacobian(&self, vars: &[Symbol]) -> ExprMatrix {
        let data: Vec<Vec<Expr>> = self.data.iter().map(|expr| expr.diff_multi(vars)).collect();
        ExprMatrix {
            data,
            nrows: self.len(),
            ncols: vars.len(),
        }
    }

    /// Evaluate vector numerically
    pub fn evaluate(&self, values: &HashMap<Symbol, f64>) -> Result<DVector<f64>, MatrixError> {
        let evaluated = self
            .data
            .iter()
            .map(|expr| expr.eval(values))
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(DVector::from_vec(evaluated))
    }

    /// Convert to lambdified function of positional arguments
    pub fn lambdify(
        &self,
        args: &[Symbol],
    ) -> Result<Box<dyn Fn(&[f64]) -> DVector<f64> + Send + Sync>, MatrixError> {
        let funcs = self
            .data
            .iter()
            .map(|expr| expr.lambdify(args))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Box::new(move |values: &[f64]| {
            DVector::from_iterator(funcs.len(), funcs.iter().map(|f| f(values)))
        }))
    }
}

impl Index<usize> for ExprVector {
    type Output = Expr;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<usize> for ExprVector {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}

///////////////////////////////////////////////////////////////////////////
// Matrix
///////////////////////////////////////////////////////////////////////////

/// Dense, rectangular symbolic matrix.
///
/// The shape is stored explicitly and never inferred from `data`, so `0×k` and
/// `k×0` matrices are distinct values usable as empty blocks.
#[derive(Clone, Debug, PartialEq)]
pub struct ExprMatrix {
    pub data: Vec<Vec<Expr>>,
    pub nrows: usize,
    pub ncols: usize,
}

impl ExprMatrix {
    /// Create new symbolic matrix from rows; ragged rows are rejected.
    pub fn new(data: Vec<Vec<Expr>>) -> Result<Self, MatrixError> {
        let nrows = data.len();
        let ncols = if nrows > 0 { data[0].len() } else { 0 };

        for row in &data {
            if row.len() != ncols {
                return Err(MatrixError::DimensionMismatch {
                    context: "ragged matrix rows".to_string(),
                    expected: (nrows, ncols),
                    found: (nrows, row.len()),
                });
            }
        }

        Ok(Self { data, nrows, ncols })
    }

    /// Create zero matrix
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        let data = vec![vec![Expr::Const(0.0); ncols]; nrows];
        Self { data, nrows, ncols }
    }

    /// Create diagonal matrix from vector
    pub fn diagonal(diag: &ExprVector) -> Self {
        let size = diag.len();
        let mut data = vec![vec![Expr::Const(0.0); size]; size];
        for i in 0..size {
            data[i][i] = diag[i].clone();
        }
        Self {
            data,
            nrows: size,
            ncols: size,
        }
    }

    /// Matrix of bare symbols, one row per inner vector
    pub fn from_symbols(rows: &[Vec<Symbol>]) -> Result<Self, MatrixError> {
        Self::new(
            rows.iter()
                .map(|row| row.iter().map(Symbol::to_expr).collect())
                .collect(),
        )
    }

    /// Symbolic copy of a numeric matrix
    pub fn from_dmatrix(values: &DMatrix<f64>) -> Self {
        let data = (0..values.nrows())
            .map(|i| (0..values.ncols()).map(|j| Expr::Const(values[(i, j)])).collect())
            .collect();
        Self {
            data,
            nrows: values.nrows(),
            ncols: values.ncols(),
        }
    }

    /// Get dimensions
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    pub fn is_empty(&self) -> bool {
        self.nrows == 0 || self.ncols == 0
    }

    /// Get element at (i, j)
    pub fn get(&self, i: usize, j: usize) -> Option<&Expr> {
        self.data.get(i)?.get(j)
    }

    /// Overwrite element at (i, j)
    pub fn set(&mut self, i: usize, j: usize, expr: Expr) {
        self.data[i][j] = expr;
    }

    /// Row-major iterator over `((i, j), entry)`
    pub fn cells(&self) -> impl Iterator<Item = ((usize, usize), &Expr)> {
        self.data
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.iter().enumerate().map(move |(j, e)| ((i, j), e)))
    }

    /// Transpose
    pub fn transpose(&self) -> ExprMatrix {
        let mut data = vec![vec![Expr::Const(0.0); self.nrows]; self.ncols];
        for i in 0..self.nrows {
            for j in 0..self.ncols {
                data[j][i] = self.data[i][j].clone();
            }
        }
        ExprMatrix {
            data,
            nrows: self.ncols,
            ncols: self.nrows,
        }
    }

    /// Element-wise operations
    pub fn map<F>(&self, f: F) -> ExprMatrix
    where
        F: Fn(&Expr) -> Expr,
    {
        let data: Vec<Vec<Expr>> = self
            .data
            .iter()
            .map(|row| row.iter().map(&f).collect())
            .collect();
        ExprMatrix {
            data,
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }

    /// Substitute symbols
    pub fn subs(&self, map: &HashMap<Symbol, Expr>) -> ExprMatrix {
        self.map(|expr| expr.subs(map))
    }

    /// Differentiate with respect to a symbol
    pub fn diff(&self, var: &Symbol) -> ExprMatrix {
        self.map(|expr| expr.diff(var))
    }

    /// Evaluate matrix numerically
    pub fn evaluate(&self, values: &HashMap<Symbol, f64>) -> Result<DMatrix<f64>, MatrixError> {
        let mut result = DMatrix::zeros(self.nrows, self.ncols);
        for ((i, j), expr) in self.cells() {
            result[(i, j)] = expr.eval(values)?;
        }
        Ok(result)
    }

    /// Flatten to vector (row-major order)
    pub fn flatten(&self) -> ExprVector {
        ExprVector::new(
            self.data
                .iter()
                .flat_map(|row| row.iter().cloned())
                .collect(),
        )
    }

    /// Distinct symbols in row-major first-seen order
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for (_, expr) in self.cells() {
            expr.collect_symbols(&mut seen, &mut out);
        }
        out
    }

    /// True if every mirrored pair of entries is structurally identical
    pub fn is_symmetric(&self) -> bool {
        self.is_square()
            && (0..self.nrows).all(|i| (0..i).all(|j| self.data[i][j] == self.data[j][i]))
    }

    /// Join `other` to the right of `self`; row counts must agree.
    pub fn row_join(&self, other: &ExprMatrix) -> Result<ExprMatrix, MatrixError> {
        Self::hstack(&[self.clone(), other.clone()])
    }

    /// Join `other` below `self`; column counts must agree.
    pub fn col_join(&self, other: &ExprMatrix) -> Result<ExprMatrix, MatrixError> {
        Self::vstack(&[self.clone(), other.clone()])
    }

    /// Concatenate matrices horizontally
    pub fn hstack(matrices: &[ExprMatrix]) -> Result<ExprMatrix, MatrixError> {
        if matrices.is_empty() {
            return Ok(ExprMatrix::zeros(0, 0));
        }

        let nrows = matrices[0].nrows;
        for mat in matrices {
            if mat.nrows != nrows {
                return Err(MatrixError::DimensionMismatch {
                    context: "row join".to_string(),
                    expected: (nrows, mat.ncols),
                    found: mat.shape(),
                });
            }
        }

        let total_cols: usize = matrices.iter().map(|m| m.ncols).sum();
        let mut data = vec![Vec::with_capacity(total_cols); nrows];
        for mat in matrices {
            for (i, row) in mat.data.iter().enumerate() {
                data[i].extend(row.iter().cloned());
            }
        }

        Ok(ExprMatrix {
            data,
            nrows,
            ncols: total_cols,
        })
    }

    /// Concatenate matrices vertically
    pub fn vstack(matrices: &[ExprMatrix]) -> Result<ExprMatrix, MatrixError> {
        if matrices.is_empty() {
            return Ok(ExprMatrix::zeros(0, 0));
        }

        let ncols = matrices[0].ncols;
        for mat in matrices {
            if mat.ncols != ncols {
                return Err(MatrixError::DimensionMismatch {
                    context: "column join".to_string(),
                    expected: (mat.nrows, ncols),
                    found: mat.shape(),
                });
            }
        }

        let total_rows: usize = matrices.iter().map(|m| m.nrows).sum();
        let mut data = Vec::with_capacity(total_rows);
        for mat in matrices {
            data.extend(mat.data.iter().cloned());
        }

        Ok(ExprMatrix {
            data,
            nrows: total_rows,
            ncols,
        })
    }
}

impl Index<(usize, usize)> for ExprMatrix {
    type Output = Expr;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.data[i][j] // i - row, j - column
    }
}

impl IndexMut<(usize, usize)> for ExprMatrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        &mut self.data[i][j]
    }
}

impl fmt::Display for ExprMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, row) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            let row: Vec<String> = row.iter().map(|e| e.to_string()).collect();
            write!(f, "{}", row.join(", "))?;
        }
        write!(f, "]")
    }
}
