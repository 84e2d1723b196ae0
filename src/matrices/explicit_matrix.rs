use crate::matrices::matrix_errors::MatrixError;
use crate::symbolic::symbolic_engine::{Expr, Symbol, SymbolKind};
use crate::symbolic::symbolic_vectors::{ExprMatrix, ExprVector};
use itertools::iproduct;
use log::debug;
use strum_macros::{Display, EnumIter, EnumString};

/// Structure imposed on a matrix of fresh unknowns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum MatrixStructure {
    /// every entry is its own unknown
    General,
    /// entries below the diagonal repeat the mirrored entry above it
    Symmetric,
    /// unknowns on the diagonal, structural zeros elsewhere
    Diagonal,
}

/// Name of the unknown at 1-based position (`row`, `col`): `name_{row}{col}`.
///
/// Indices are concatenated without a separator, so `A_111` is ambiguous once
/// either dimension goes past 9.
pub fn entry_name(name: &str, row: usize, col: usize) -> String {
    format!("{}_{}{}", name, row, col)
}

/// Builds an `n × m` matrix of freshly named unknowns.
///
/// All unknowns share one `kind`, so static and time-dependent symbols never mix
/// inside a matrix built here. `Symmetric` still names every entry first and then
/// overwrites the lower triangle with the upper one.
///
/// # Example
/// ```
/// use RustedMatrixSys::matrices::explicit_matrix::{construct_explicit_matrix, MatrixStructure};
/// use RustedMatrixSys::symbolic::symbolic_engine::SymbolKind;
/// let p = construct_explicit_matrix("P", 2, 2, MatrixStructure::Symmetric, SymbolKind::Dynamic).unwrap();
/// assert_eq!(p[(1, 0)], p[(0, 1)]);
/// assert_eq!(p[(0, 1)].to_string(), "P_12(t)");
/// ```
pub fn construct_explicit_matrix(
    name: &str,
    n: usize,
    m: usize,
    structure: MatrixStructure,
    kind: SymbolKind,
) -> Result<ExprMatrix, MatrixError> {
    if n != m && structure != MatrixStructure::General {
        return Err(MatrixError::InvalidShape {
            structure: structure.to_string(),
            nrows: n,
            ncols: m,
        });
    }
    let symbol = |row: usize, col: usize| Symbol::with_kind(&entry_name(name, row, col), kind);

    let matrix = match structure {
        MatrixStructure::Diagonal => {
            let diag: Vec<Expr> = (1..=m).map(|i| symbol(i, i).to_expr()).collect();
            ExprMatrix::diagonal(&ExprVector::new(diag))
        }
        MatrixStructure::General | MatrixStructure::Symmetric => {
            let data: Vec<Vec<Expr>> = (1..=n)
                .map(|row| (1..=m).map(|col| symbol(row, col).to_expr()).collect())
                .collect();
            let mut matrix = ExprMatrix {
                data,
                nrows: n,
                ncols: m,
            };
            if structure == MatrixStructure::Symmetric {
                for (i, j) in iproduct!(0..m, 0..m).filter(|&(i, j)| j < i) {
                    matrix[(i, j)] = matrix[(j, i)].clone();
                }
            }
            matrix
        }
    };
    debug!(
        "built {} {}x{} matrix {} of {} symbols",
        structure, n, m, name, kind
    );
    Ok(matrix)
}
