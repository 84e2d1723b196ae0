#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) builds symbolic expressions out of static `x` and dynamic `x(t)` symbols
/// 2) substitutes and evaluates them
/// 3) turns a symbolic expression into a Rust closure of positional arguments
///# Example#
/// ```
/// use RustedMatrixSys::symbolic::symbolic_engine::{Expr, Symbol};
/// use std::collections::HashMap;
/// let (x, y) = RustedMatrixSys::symbols!(x, y);
/// let expr = x.to_expr() * y.to_expr() + Expr::Const(1.0);
/// println!("expr = {}", expr);
/// let df_dx = expr.diff(&x);
/// assert_eq!(df_dx, y.to_expr());
/// let f = expr.lambdify(&[x.clone(), y.clone()]).unwrap();
/// assert_eq!(f(&[2.0, 3.0]), 7.0);
/// let v = expr.eval(&HashMap::from([(x, 2.0), (y, 3.0)])).unwrap();
/// assert_eq!(v, 7.0);
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
pub mod symbolic_engine_derivatives;
///________________________________________________________________________________________________________________________________________________
///
/// symbolic vectors and matrices: shapes, joins, substitution, jacobians and numeric evaluation
/// into nalgebra types
pub mod symbolic_vectors;
