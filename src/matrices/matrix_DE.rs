use crate::matrices::matrix_errors::MatrixError;
use crate::symbolic::symbolic_engine::{Expr, Symbol};
use crate::symbolic::symbolic_vectors::{ExprMatrix, ExprVector};
use crate::systems::dynamical_system::DynamicalSystem;
use log::{info, warn};
use std::collections::HashMap;

/// Distinct state symbols of `mat_var` in row-major first-seen order.
///
/// This is the unraveled order of the vector-form system; samples of a simulation
/// of that system are laid out in this order.
pub fn unraveled_state(mat_var: &ExprMatrix) -> Result<Vec<Symbol>, MatrixError> {
    let mut vec_var: Vec<Symbol> = Vec::new();
    for ((i, j), entry) in mat_var.cells() {
        let symbol = entry.as_symbol().ok_or_else(|| MatrixError::NotASymbol {
            entry: entry.to_string(),
            row: i,
            col: j,
        })?;
        if !vec_var.contains(symbol) {
            vec_var.push(symbol.clone());
        }
    }
    Ok(vec_var)
}

/// Flattens `d(mat_var)/dt = mat_DE` into the vector form `d(vec_var)/dt = vec_DE`.
///
/// `vec_var` is [`unraveled_state`] of `mat_var`. The cell `(i, j)` of `mat_DE` lands
/// at the flat index of `mat_var[(i, j)]`. When a state symbol appears more than once
/// the cell visited last (row-major) provides the derivative; a differing earlier
/// expression is overwritten with a warning.
pub fn vector_DE_from_matrix_DE(
    mat_DE: &ExprMatrix,
    mat_var: &ExprMatrix,
) -> Result<(ExprVector, Vec<Symbol>), MatrixError> {
    if mat_DE.shape() != mat_var.shape() {
        return Err(MatrixError::ShapeMismatch {
            de_shape: mat_DE.shape(),
            var_shape: mat_var.shape(),
        });
    }
    let vec_var = unraveled_state(mat_var)?;
    let index: HashMap<&Symbol, usize> = vec_var.iter().enumerate().map(|(k, s)| (s, k)).collect();

    let mut vec_DE: Vec<Option<Expr>> = vec![None; vec_var.len()];
    for ((i, j), expr) in mat_DE.cells() {
        let symbol = mat_var[(i, j)]
            .as_symbol()
            .ok_or_else(|| MatrixError::NotASymbol {
                entry: mat_var[(i, j)].to_string(),
                row: i,
                col: j,
            })?;
        let idx = index[symbol];
        if let Some(previous) = &vec_DE[idx] {
            if previous != expr {
                warn!(
                    "state {} repeats with a different derivative at ({}, {}): {} replaces {}",
                    symbol, i, j, expr, previous
                );
            }
        }
        vec_DE[idx] = Some(expr.clone());
    }
    let vec_DE = ExprVector::new(
        vec_DE
            .into_iter()
            .map(|e| e.unwrap_or(Expr::Const(0.0)))
            .collect(),
    );
    Ok((vec_DE, vec_var))
}

/// Builds the vector-form system of a matrix differential equation.
///
/// * `mat_DE` - matrix of derivative expressions
/// * `mat_var` - matrix of state symbols, same shape; repeats allowed
/// * `mat_input` - input symbols, flattened row-major
/// * `constants` - constant symbol values substituted into the state equation
///
/// # Example
/// ```
/// use RustedMatrixSys::matrices::explicit_matrix::{construct_explicit_matrix, MatrixStructure};
/// use RustedMatrixSys::matrices::matrix_DE::system_from_matrix_DE;
/// use RustedMatrixSys::symbolic::symbolic_engine::SymbolKind;
/// let p = construct_explicit_matrix("P", 2, 2, MatrixStructure::Symmetric, SymbolKind::Dynamic).unwrap();
/// let minus_p = p.map(|e| -e.clone());
/// let sys = system_from_matrix_DE(&minus_p, &p, None, None).unwrap();
/// assert_eq!(sys.dim_state, 3);
/// ```
pub fn system_from_matrix_DE(
    mat_DE: &ExprMatrix,
    mat_var: &ExprMatrix,
    mat_input: Option<&ExprMatrix>,
    constants: Option<&HashMap<Symbol, f64>>,
) -> Result<DynamicalSystem, MatrixError> {
    let (vec_DE, vec_var) = vector_DE_from_matrix_DE(mat_DE, mat_var)?;
    if vec_var.windows(2).any(|w| w[0].kind() != w[1].kind()) {
        warn!("state matrix mixes static and dynamic symbols");
    }
    let input = match mat_input {
        Some(mat_input) => mat_input
            .cells()
            .map(|((i, j), e)| {
                e.as_symbol().cloned().ok_or_else(|| MatrixError::NotASymbol {
                    entry: e.to_string(),
                    row: i,
                    col: j,
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    info!(
        "matrix DE {:?} flattened to {} distinct states",
        mat_var.shape(),
        vec_var.len()
    );
    DynamicalSystem::new(
        vec_DE,
        vec_var,
        input,
        constants.cloned().unwrap_or_default(),
    )
}
