//! Vector-form dynamical system `dx/dt = f(t, x, u)`.
//!
//! Holds the symbolic state equation together with the ordered state and input
//! symbols, substitutes constant values and compiles `f` into a closure over
//! `[t, x..., u...]`. Output is the full state. The symbolic Jacobians give the
//! linearization `A = df/dx`, `B = df/du` around any point.
use crate::matrices::matrix_errors::MatrixError;
use crate::symbolic::symbolic_engine::{Expr, Symbol};
use crate::symbolic::symbolic_vectors::{ExprMatrix, ExprVector};
use log::info;
use nalgebra::{DMatrix, DVector};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

type VectorFn = Arc<dyn Fn(&[f64]) -> DVector<f64> + Send + Sync>;

pub struct DynamicalSystem {
    pub state_equation: ExprVector,
    pub state: Vec<Symbol>,
    pub input: Vec<Symbol>,
    pub constants_values: HashMap<Symbol, f64>,
    pub dim_state: usize,
    pub dim_input: usize,
    pub dim_output: usize,
    state_equation_lambdified: VectorFn,
}

impl DynamicalSystem {
    pub fn new(
        state_equation: ExprVector,
        state: Vec<Symbol>,
        input: Vec<Symbol>,
        constants_values: HashMap<Symbol, f64>,
    ) -> Result<Self, MatrixError> {
        if state_equation.len() != state.len() {
            return Err(MatrixError::DimensionMismatch {
                context: "state equation vs state".to_string(),
                expected: (state.len(), 1),
                found: (state_equation.len(), 1),
            });
        }
        let arguments = Self::arguments(&state, &input);
        let mut seen = HashSet::new();
        if let Some(symbol) = arguments.iter().find(|s| !seen.insert(*s)) {
            return Err(MatrixError::DuplicateArgument {
                symbol: symbol.to_string(),
            });
        }
        let compiled = Self::with_constants(&state_equation, &constants_values);
        let lambdified = compiled.lambdify(&arguments)?;
        let dim_state = state.len();
        let dim_input = input.len();
        info!(
            "dynamical system with {} states, {} inputs and {} constants",
            dim_state,
            dim_input,
            constants_values.len()
        );
        Ok(Self {
            state_equation,
            state,
            input,
            constants_values,
            dim_state,
            dim_input,
            dim_output: dim_state,
            state_equation_lambdified: Arc::from(lambdified),
        })
    }

    fn with_constants(
        equation: &ExprVector,
        constants_values: &HashMap<Symbol, f64>,
    ) -> ExprVector {
        let map: HashMap<Symbol, Expr> = constants_values
            .iter()
            .map(|(s, v)| (s.clone(), Expr::Const(*v)))
            .collect();
        equation.subs(&map)
    }

    /// `[t, x..., u...]`, the argument order of the compiled state equation
    fn arguments(state: &[Symbol], input: &[Symbol]) -> Vec<Symbol> {
        std::iter::once(Symbol::time())
            .chain(state.iter().cloned())
            .chain(input.iter().cloned())
            .collect()
    }

    fn pack(&self, t: f64, x: &DVector<f64>, u: &DVector<f64>) -> Result<Vec<f64>, MatrixError> {
        if x.len() != self.dim_state {
            return Err(MatrixError::DimensionMismatch {
                context: "state vector".to_string(),
                expected: (self.dim_state, 1),
                found: (x.len(), 1),
            });
        }
        if u.len() != self.dim_input {
            return Err(MatrixError::DimensionMismatch {
                context: "input vector".to_string(),
                expected: (self.dim_input, 1),
                found: (u.len(), 1),
            });
        }
        let mut args = Vec::with_capacity(1 + x.len() + u.len());
        args.push(t);
        args.extend(x.iter());
        args.extend(u.iter());
        Ok(args)
    }

    /// dx/dt at (t, x, u)
    pub fn state_equation_function(
        &self,
        t: f64,
        x: &DVector<f64>,
        u: &DVector<f64>,
    ) -> Result<DVector<f64>, MatrixError> {
        let args = self.pack(t, x, u)?;
        Ok((self.state_equation_lambdified)(&args))
    }

    /// Output is the state itself.
    pub fn output_equation_function(&self, _t: f64, x: &DVector<f64>) -> DVector<f64> {
        x.clone()
    }

    /// Right-hand side with the input frozen at `u`, in the `(t, y) -> dy/dt` form
    /// taken by IVP solvers.
    ///
    /// # Panics
    /// The returned closure panics if `y` does not have `dim_state` entries.
    pub fn rhs_closure(
        &self,
        u: DVector<f64>,
    ) -> Result<Box<dyn Fn(f64, &DVector<f64>) -> DVector<f64> + Send + Sync>, MatrixError> {
        if u.len() != self.dim_input {
            return Err(MatrixError::DimensionMismatch {
                context: "input vector".to_string(),
                expected: (self.dim_input, 1),
                found: (u.len(), 1),
            });
        }
        let f = Arc::clone(&self.state_equation_lambdified);
        let dim_state = self.dim_state;
        Ok(Box::new(move |t: f64, y: &DVector<f64>| {
            assert_eq!(
                y.len(),
                dim_state,
                "state vector has {} entries, the system has {} states",
                y.len(),
                dim_state
            );
            let mut args = Vec::with_capacity(1 + y.len() + u.len());
            args.push(t);
            args.extend(y.iter());
            args.extend(u.iter());
            f(&args)
        }))
    }

    /// d(state_equation)/d(state), constants substituted
    pub fn state_jacobian(&self) -> ExprMatrix {
        Self::with_constants(&self.state_equation, &self.constants_values).jacobian(&self.state)
    }

    /// d(state_equation)/d(input), constants substituted
    pub fn input_jacobian(&self) -> ExprMatrix {
        Self::with_constants(&self.state_equation, &self.constants_values).jacobian(&self.input)
    }

    /// Numeric `(A, B)` of the linearization at (t, x, u).
    pub fn linearize(
        &self,
        t: f64,
        x: &DVector<f64>,
        u: &DVector<f64>,
    ) -> Result<(DMatrix<f64>, DMatrix<f64>), MatrixError> {
        let args = self.pack(t, x, u)?;
        let values: HashMap<Symbol, f64> = Self::arguments(&self.state, &self.input)
            .into_iter()
            .zip(args)
            .collect();
        let a = self.state_jacobian().evaluate(&values)?;
        let b = self.input_jacobian().evaluate(&values)?;
        Ok((a, b))
    }
}
