use crate::symbolic::symbolic_engine::{Expr, Symbol};

// Folding helpers keep structural zeros recognisable after differentiation:
// d(a*x)/dy must come back as Const(0.0), not as a tree of zero products.
fn add(lhs: Expr, rhs: Expr) -> Expr {
    match (&lhs, &rhs) {
        (Expr::Const(a), Expr::Const(b)) => Expr::Const(a + b),
        _ if lhs.is_zero() => rhs,
        _ if rhs.is_zero() => lhs,
        _ => lhs + rhs,
    }
}

fn sub(lhs: Expr, rhs: Expr) -> Expr {
    match (&lhs, &rhs) {
        (Expr::Const(a), Expr::Const(b)) => Expr::Const(a - b),
        _ if rhs.is_zero() => lhs,
        _ if lhs.is_zero() => -rhs,
        _ => lhs - rhs,
    }
}

fn mul(lhs: Expr, rhs: Expr) -> Expr {
    match (&lhs, &rhs) {
        (Expr::Const(a), Expr::Const(b)) => Expr::Const(a * b),
        _ if lhs.is_zero() || rhs.is_zero() => Expr::Const(0.0),
        _ if lhs.is_one() => rhs,
        _ if rhs.is_one() => lhs,
        _ => lhs * rhs,
    }
}

fn div(lhs: Expr, rhs: Expr) -> Expr {
    if lhs.is_zero() {
        return Expr::Const(0.0);
    }
    if rhs.is_one() {
        return lhs;
    }
    lhs / rhs
}

impl Expr {
    /// Analytical derivative with respect to `var`.
    ///
    /// Other symbols, including dynamic ones, are treated as independent of `var`.
    pub fn diff(&self, var: &Symbol) -> Expr {
        match self {
            Expr::Var(symbol) => {
                if symbol == var {
                    Expr::Const(1.0)
                } else {
                    Expr::Const(0.0)
                }
            }
            Expr::Const(_) => Expr::Const(0.0),
            Expr::Add(lhs, rhs) => add(lhs.diff(var), rhs.diff(var)),
            Expr::Sub(lhs, rhs) => sub(lhs.diff(var), rhs.diff(var)),
            Expr::Mul(lhs, rhs) => add(
                mul(lhs.diff(var), *rhs.clone()),
                mul(*lhs.clone(), rhs.diff(var)),
            ),
            Expr::Div(lhs, rhs) => div(
                sub(
                    mul(lhs.diff(var), *rhs.clone()),
                    mul(rhs.diff(var), *lhs.clone()),
                ),
                mul(*rhs.clone(), *rhs.clone()),
            ),
            Expr::Pow(base, exp) => {
                if exp.contains_symbol(var) {
                    // d(b^e) = b^e * (e' ln b + e b'/b)
                    mul(
                        self.clone(),
                        add(
                            mul(exp.diff(var), base.as_ref().clone().ln()),
                            div(mul(*exp.clone(), base.diff(var)), *base.clone()),
                        ),
                    )
                } else {
                    mul(
                        mul(
                            *exp.clone(),
                            base.as_ref()
                                .clone()
                                .pow(sub(*exp.clone(), Expr::Const(1.0))),
                        ),
                        base.diff(var),
                    )
                }
            }
            Expr::Exp(arg) => mul(self.clone(), arg.diff(var)),
            Expr::Ln(arg) => div(arg.diff(var), *arg.clone()),
            Expr::sin(arg) => mul(Expr::cos(arg.clone()), arg.diff(var)),
            Expr::cos(arg) => mul(-Expr::sin(arg.clone()), arg.diff(var)),
            Expr::tg(arg) => div(
                arg.diff(var),
                Expr::cos(arg.clone()).pow(Expr::Const(2.0)),
            ),
        }
    }

    /// Gradient with respect to each of `vars`, in order.
    pub fn diff_multi(&self, vars: &[Symbol]) -> Vec<Expr> {
        vars.iter().map(|var| self.diff(var)).collect()
    }
}
