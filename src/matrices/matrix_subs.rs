use crate::matrices::matrix_errors::MatrixError;
use crate::symbolic::symbolic_engine::{Expr, Symbol};
use crate::symbolic::symbolic_vectors::ExprMatrix;
use std::collections::HashMap;

/// What to flatten into scalar substitutions.
///
/// The first matrix of every pair holds the unknowns, the second one the values;
/// both must have the same shape.
#[derive(Clone, Copy, Debug)]
pub enum SubsSource<'a> {
    /// one (symbolic, value) pair
    Pair(&'a ExprMatrix, &'a ExprMatrix),
    /// several pairs, flattened one after the other
    Pairs(&'a [(ExprMatrix, ExprMatrix)]),
    /// several pairs collapsed into a symbol -> value mapping
    Mapping(&'a [(ExprMatrix, ExprMatrix)]),
}

/// Flattened substitutions; the variant mirrors the [`SubsSource`] it came from.
#[derive(Clone, Debug, PartialEq)]
pub enum Substitutions {
    /// positional pairs; a symbol present in two source matrices shows up twice
    Pairs(Vec<(Symbol, Expr)>),
    /// last write wins when a symbol shows up more than once
    Map(HashMap<Symbol, Expr>),
}

impl Substitutions {
    pub fn len(&self) -> usize {
        match self {
            Substitutions::Pairs(pairs) => pairs.len(),
            Substitutions::Map(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mapping form of the substitutions; for `Pairs` later pairs win.
    pub fn to_map(&self) -> HashMap<Symbol, Expr> {
        match self {
            Substitutions::Pairs(pairs) => pairs.iter().cloned().collect(),
            Substitutions::Map(map) => map.clone(),
        }
    }

    pub fn apply(&self, matrix: &ExprMatrix) -> ExprMatrix {
        matrix.subs(&self.to_map())
    }
}

/// Walks one pair and emits `(symbol, value)` for every entry of `symbolic` that is
/// not a structural zero, in row-major order.
fn flatten_pair(
    symbolic: &ExprMatrix,
    values: &ExprMatrix,
) -> Result<Vec<(Symbol, Expr)>, MatrixError> {
    if symbolic.shape() != values.shape() {
        return Err(MatrixError::DimensionMismatch {
            context: "substitution pair".to_string(),
            expected: symbolic.shape(),
            found: values.shape(),
        });
    }
    let mut out = Vec::new();
    for ((i, j), entry) in symbolic.cells() {
        if entry.is_zero() {
            continue;
        }
        let symbol = entry.as_symbol().ok_or_else(|| MatrixError::NotASymbol {
            entry: entry.to_string(),
            row: i,
            col: j,
        })?;
        out.push((symbol.clone(), values[(i, j)].clone()));
    }
    Ok(out)
}

/// Flattens matrix pairs into scalar substitutions ready for [`ExprMatrix::subs`].
///
/// Shapes are checked pair by pair and a mismatch fails the whole call.
pub fn matrix_subs(source: SubsSource<'_>) -> Result<Substitutions, MatrixError> {
    match source {
        SubsSource::Pair(symbolic, values) => {
            Ok(Substitutions::Pairs(flatten_pair(symbolic, values)?))
        }
        SubsSource::Pairs(pairs) => {
            let mut out = Vec::new();
            for (symbolic, values) in pairs {
                out.extend(flatten_pair(symbolic, values)?);
            }
            Ok(Substitutions::Pairs(out))
        }
        SubsSource::Mapping(pairs) => {
            let mut out = HashMap::new();
            for (symbolic, values) in pairs {
                out.extend(flatten_pair(symbolic, values)?);
            }
            Ok(Substitutions::Map(out))
        }
    }
}
