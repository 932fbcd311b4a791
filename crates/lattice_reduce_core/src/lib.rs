//! Lattice Reduce Core Library
//!
//! LLL lattice basis reduction with floating-point Gram-Schmidt, exact
//! integer updates and removal of dependent or short vectors.
//!
//! # Overview
//!
//! Big-integer bases are reduced by steering every exact row operation with
//! `f64` approximations of the Gram-Schmidt data. When the approximations
//! lose too much precision the affected row is redone with exact scalar
//! products, so the result is always a basis of the input lattice.
//!
//! # Key Components
//!
//! - [`lattice`] - Lattice bases, floating Gram-Schmidt and LLL reduction
//! - [`matrix`] - Dense matrix operations
//! - [`rational`] - Exact rational number type
//! - [`error`] - Error type shared by all modules

pub mod error;
pub mod lattice;
pub mod matrix;
pub mod rational;

pub use error::{LllError, Result};
pub use lattice::{
    reduce, GramSchmidt, GramSchmidtMode, KeepAll, LLLConfig, LLLStats, LatticeBasis,
    ReductionOutcome, RemovalPolicy, RemoveBelow, LLL,
};
pub use matrix::Matrix;
pub use rational::Rational;
