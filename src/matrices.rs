#![allow(non_snake_case)]
//! Matrix-valued symbolic models of dynamical systems.
//!
//! Builders for named symbolic matrices, flattening of matrix substitutions,
//! block assembly, reshaping of vector trajectories back into matrix form and
//! conversion of a matrix differential equation into a vector-form system.
/// error type shared by the matrix modeling layer
pub mod matrix_errors;
/// matrices of named symbols `name_{ij}`: general, symmetric or diagonal
pub mod explicit_matrix;
/// flatten (symbolic matrix, value matrix) pairs into scalar substitutions
pub mod matrix_subs;
/// assemble a matrix from a grid of blocks
pub mod block_matrix;
/// interpolating callable over sampled vector trajectories
pub mod trajectory;
/// matrix-shaped view of a vector trajectory
pub mod matrix_trajectory;
/// matrix differential equation -> vector-form dynamical system
pub mod matrix_DE;
#[cfg(test)]
mod matrices_tests;
