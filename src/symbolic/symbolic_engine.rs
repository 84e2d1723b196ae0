//! # Symbolic Engine Module
//!
//! Minimal symbolic expression engine used by the matrix modeling layer.
//!
//! ## Main Structures
//!
//! ### `Symbol`
//! An atomic unknown. Identity is by value: two separately built `Symbol`s with the
//! same name and the same [`SymbolKind`] are the same unknown, compare equal and hash
//! identically. This is what lets matrices built in different places refer to one
//! unknown without a process-wide symbol table.
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(Symbol)` - static (`x`) or dynamic (`x(t)`) unknowns
//! - **Constants**: `Const(f64)` - numerical constants; `Const(0.0)` doubles as the
//!   structural zero of sparse symbolic matrices
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow`
//! - **Functions**: `Exp`, `Ln`, `sin`, `cos`, `tg`
//!
//! ### Key Methods
//! - `subs()` - simultaneous substitution of symbols by expressions
//! - `eval()` - numeric evaluation against a symbol/value map
//! - `lambdify()` - positional closure over an ordered list of symbols
//! - `diff()` - analytical differentiation (see `symbolic_engine_derivatives`)

#![allow(non_camel_case_types)]

use crate::matrices::matrix_errors::MatrixError;
use std::collections::{HashMap, HashSet};
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};

/// Family of a symbol: plain unknown or implicit function of time.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum SymbolKind {
    /// time independent unknown, printed as `x`
    Static,
    /// unknown that is implicitly a function of time, printed as `x(t)`
    Dynamic,
}

/// Atomic symbolic unknown.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    name: String,
    kind: SymbolKind,
}

impl Symbol {
    /// static symbol
    pub fn new(name: &str) -> Self {
        Self::with_kind(name, SymbolKind::Static)
    }
    /// time-dependent symbol
    pub fn dynamic(name: &str) -> Self {
        Self::with_kind(name, SymbolKind::Dynamic)
    }
    pub fn with_kind(name: &str, kind: SymbolKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
    /// the independent variable `t`
    pub fn time() -> Self {
        Self::new("t")
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn kind(&self) -> SymbolKind {
        self.kind
    }
    pub fn is_dynamic(&self) -> bool {
        self.kind == SymbolKind::Dynamic
    }
    /// wrap the symbol into an expression
    pub fn to_expr(&self) -> Expr {
        Expr::Var(self.clone())
    }
    /// Creates multiple static symbols from a comma-separated string like `"x, y, z"`.
    pub fn Symbols(symbols: &str) -> Vec<Symbol> {
        symbols
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(Symbol::new)
            .collect()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            SymbolKind::Static => write!(f, "{}", self.name),
            SymbolKind::Dynamic => write!(f, "{}(t)", self.name),
        }
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Expr::Var(symbol)
    }
}

impl From<f64> for Expr {
    fn from(val: f64) -> Self {
        Expr::Const(val)
    }
}

/// Symbolic expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic unknown
    Var(Symbol),
    /// Numerical constant value
    Const(f64),
    /// left + right
    Add(Box<Expr>, Box<Expr>),
    /// left - right
    Sub(Box<Expr>, Box<Expr>),
    /// left * right
    Mul(Box<Expr>, Box<Expr>),
    /// left / right
    Div(Box<Expr>, Box<Expr>),
    /// base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    Exp(Box<Expr>),
    Ln(Box<Expr>),
    sin(Box<Expr>),
    cos(Box<Expr>),
    /// tangent, mathematical notation 'tg'
    tg(Box<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(symbol) => write!(f, "{}", symbol),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
            Expr::Pow(base, exp) => write!(f, "({} ^ {})", base, exp),
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tg({})", expr),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::AddAssign for Expr {
    fn add_assign(&mut self, rhs: Self) {
        *self = Expr::Add(Box::new(self.clone()), Box::new(rhs));
    }
}

impl std::ops::SubAssign for Expr {
    fn sub_assign(&mut self, rhs: Self) {
        *self = Expr::Sub(Box::new(self.clone()), Box::new(rhs));
    }
}

impl std::ops::MulAssign for Expr {
    fn mul_assign(&mut self, rhs: Self) {
        *self = Expr::Mul(Box::new(self.clone()), Box::new(rhs));
    }
}

impl std::ops::DivAssign for Expr {
    fn div_assign(&mut self, rhs: Self) {
        *self = Expr::Div(Box::new(self.clone()), Box::new(rhs));
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    /// BASIC FEATURES

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn exp(self) -> Expr {
        Expr::Exp(self.boxed())
    }

    pub fn ln(self) -> Expr {
        Expr::Ln(self.boxed())
    }

    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    /// Checks if expression is the structural zero (constant 0.0).
    pub fn is_zero(&self) -> bool {
        match self {
            Expr::Const(val) => val == &0.0,
            _ => false,
        }
    }

    pub fn is_one(&self) -> bool {
        match self {
            Expr::Const(val) => val == &1.0,
            _ => false,
        }
    }

    /// The symbol if the expression is a bare unknown.
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Expr::Var(symbol) => Some(symbol),
            _ => None,
        }
    }

    /// Rebuild the tree bottom-up, applying `f` to every leaf.
    fn map_leaves<F>(&self, f: &F) -> Expr
    where
        F: Fn(&Expr) -> Expr,
    {
        match self {
            Expr::Var(_) | Expr::Const(_) => f(self),
            Expr::Add(lhs, rhs) => Expr::Add(lhs.map_leaves(f).boxed(), rhs.map_leaves(f).boxed()),
            Expr::Sub(lhs, rhs) => Expr::Sub(lhs.map_leaves(f).boxed(), rhs.map_leaves(f).boxed()),
            Expr::Mul(lhs, rhs) => Expr::Mul(lhs.map_leaves(f).boxed(), rhs.map_leaves(f).boxed()),
            Expr::Div(lhs, rhs) => Expr::Div(lhs.map_leaves(f).boxed(), rhs.map_leaves(f).boxed()),
            Expr::Pow(base, exp) => {
                Expr::Pow(base.map_leaves(f).boxed(), exp.map_leaves(f).boxed())
            }
            Expr::Exp(expr) => Expr::Exp(expr.map_leaves(f).boxed()),
            Expr::Ln(expr) => Expr::Ln(expr.map_leaves(f).boxed()),
            Expr::sin(expr) => Expr::sin(expr.map_leaves(f).boxed()),
            Expr::cos(expr) => Expr::cos(expr.map_leaves(f).boxed()),
            Expr::tg(expr) => Expr::tg(expr.map_leaves(f).boxed()),
        }
    }

    /// Simultaneous substitution: every occurrence of a key symbol is replaced by its
    /// expression. Replacements are not substituted again.
    pub fn subs(&self, map: &HashMap<Symbol, Expr>) -> Expr {
        self.map_leaves(&|leaf| match leaf {
            Expr::Var(symbol) => map.get(symbol).cloned().unwrap_or_else(|| leaf.clone()),
            _ => leaf.clone(),
        })
    }

    /// Substitutes a single symbol with an expression.
    pub fn substitute_variable(&self, var: &Symbol, expr: &Expr) -> Expr {
        self.map_leaves(&|leaf| match leaf {
            Expr::Var(symbol) if symbol == var => expr.clone(),
            _ => leaf.clone(),
        })
    }

    /// Substitutes symbols with constant values; unmapped symbols are kept.
    pub fn set_variable_from_map(&self, var_map: &HashMap<Symbol, f64>) -> Expr {
        self.map_leaves(&|leaf| match leaf {
            Expr::Var(symbol) => match var_map.get(symbol) {
                Some(val) => Expr::Const(*val),
                None => leaf.clone(),
            },
            _ => leaf.clone(),
        })
    }

    pub fn contains_symbol(&self, var: &Symbol) -> bool {
        match self {
            Expr::Var(symbol) => symbol == var,
            Expr::Const(_) => false,
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => lhs.contains_symbol(var) || rhs.contains_symbol(var),
            Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::sin(expr)
            | Expr::cos(expr)
            | Expr::tg(expr) => expr.contains_symbol(var),
        }
    }

    /// Distinct free symbols in first-seen (left to right) order.
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.collect_symbols(&mut seen, &mut out);
        out
    }

    pub(crate) fn collect_symbols(&self, seen: &mut HashSet<Symbol>, out: &mut Vec<Symbol>) {
        match self {
            Expr::Var(symbol) => {
                if seen.insert(symbol.clone()) {
                    out.push(symbol.clone());
                }
            }
            Expr::Const(_) => {}
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => {
                lhs.collect_symbols(seen, out);
                rhs.collect_symbols(seen, out);
            }
            Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::sin(expr)
            | Expr::cos(expr)
            | Expr::tg(expr) => expr.collect_symbols(seen, out),
        }
    }

    /// Evaluates the expression; every free symbol must be present in `values`.
    pub fn eval(&self, values: &HashMap<Symbol, f64>) -> Result<f64, MatrixError> {
        self.eval_with(&|symbol| values.get(symbol).copied())
    }

    fn eval_with<F>(&self, lookup: &F) -> Result<f64, MatrixError>
    where
        F: Fn(&Symbol) -> Option<f64>,
    {
        let res = match self {
            Expr::Var(symbol) => lookup(symbol).ok_or_else(|| MatrixError::UnboundSymbol {
                symbol: symbol.to_string(),
            })?,
            Expr::Const(val) => *val,
            Expr::Add(lhs, rhs) => lhs.eval_with(lookup)? + rhs.eval_with(lookup)?,
            Expr::Sub(lhs, rhs) => lhs.eval_with(lookup)? - rhs.eval_with(lookup)?,
            Expr::Mul(lhs, rhs) => lhs.eval_with(lookup)? * rhs.eval_with(lookup)?,
            Expr::Div(lhs, rhs) => lhs.eval_with(lookup)? / rhs.eval_with(lookup)?,
            Expr::Pow(base, exp) => base.eval_with(lookup)?.powf(exp.eval_with(lookup)?),
            Expr::Exp(expr) => expr.eval_with(lookup)?.exp(),
            Expr::Ln(expr) => expr.eval_with(lookup)?.ln(),
            Expr::sin(expr) => expr.eval_with(lookup)?.sin(),
            Expr::cos(expr) => expr.eval_with(lookup)?.cos(),
            Expr::tg(expr) => expr.eval_with(lookup)?.tan(),
        };
        Ok(res)
    }

    /// Turns the expression into a closure of positional arguments.
    ///
    /// `args[i]` is bound to `values[i]` of the returned closure. Every free symbol of
    /// the expression must appear in `args`, so the closure itself cannot fail.
    pub fn lambdify(
        &self,
        args: &[Symbol],
    ) -> Result<Box<dyn Fn(&[f64]) -> f64 + Send + Sync>, MatrixError> {
        let positions: HashMap<Symbol, usize> = args
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        let compiled = Compiled::from_expr(self, &positions)?;
        Ok(Box::new(move |values: &[f64]| compiled.call(values)))
    }
}

/// Expression with symbols already resolved to argument slots.
enum Compiled {
    Arg(usize),
    Const(f64),
    Binary(fn(f64, f64) -> f64, Box<Compiled>, Box<Compiled>),
    Unary(fn(f64) -> f64, Box<Compiled>),
}

impl Compiled {
    fn binary(
        op: fn(f64, f64) -> f64,
        lhs: &Expr,
        rhs: &Expr,
        positions: &HashMap<Symbol, usize>,
    ) -> Result<Self, MatrixError> {
        Ok(Compiled::Binary(
            op,
            Box::new(Self::from_expr(lhs, positions)?),
            Box::new(Self::from_expr(rhs, positions)?),
        ))
    }

    fn unary(
        op: fn(f64) -> f64,
        arg: &Expr,
        positions: &HashMap<Symbol, usize>,
    ) -> Result<Self, MatrixError> {
        Ok(Compiled::Unary(op, Box::new(Self::from_expr(arg, positions)?)))
    }

    fn from_expr(expr: &Expr, positions: &HashMap<Symbol, usize>) -> Result<Self, MatrixError> {
        match expr {
            Expr::Var(symbol) => positions
                .get(symbol)
                .map(|&i| Compiled::Arg(i))
                .ok_or_else(|| MatrixError::UnboundSymbol {
                    symbol: symbol.to_string(),
                }),
            Expr::Const(val) => Ok(Compiled::Const(*val)),
            Expr::Add(lhs, rhs) => Self::binary(|a, b| a + b, lhs, rhs, positions),
            Expr::Sub(lhs, rhs) => Self::binary(|a, b| a - b, lhs, rhs, positions),
            Expr::Mul(lhs, rhs) => Self::binary(|a, b| a * b, lhs, rhs, positions),
            Expr::Div(lhs, rhs) => Self::binary(|a, b| a / b, lhs, rhs, positions),
            Expr::Pow(base, exp) => Self::binary(f64::powf, base, exp, positions),
            Expr::Exp(arg) => Self::unary(f64::exp, arg, positions),
            Expr::Ln(arg) => Self::unary(f64::ln, arg, positions),
            Expr::sin(arg) => Self::unary(f64::sin, arg, positions),
            Expr::cos(arg) => Self::unary(f64::cos, arg, positions),
            Expr::tg(arg) => Self::unary(f64::tan, arg, positions),
        }
    }

    fn call(&self, values: &[f64]) -> f64 {
        match self {
            Compiled::Arg(i) => values[*i],
            Compiled::Const(val) => *val,
            Compiled::Binary(op, lhs, rhs) => op(lhs.call(values), rhs.call(values)),
            Compiled::Unary(op, arg) => op(arg.call(values)),
        }
    }
}

//___________________________________MACROS____________________________________

/// Macro to create static symbols bound to local names
/// Usage: symbols!(x, y, z) -> creates symbols x, y, z
#[macro_export]
macro_rules! symbols {
    ($($var:ident),+ $(,)?) => {
        ($( $crate::symbolic::symbolic_engine::Symbol::new(stringify!($var)) ),+)
    };
}
