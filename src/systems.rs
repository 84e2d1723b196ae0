/// vector-form dynamical system dx/dt = f(t, x, u) with symbolic state equation
pub mod dynamical_system;
