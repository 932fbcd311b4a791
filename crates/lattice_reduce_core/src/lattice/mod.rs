//! Lattice basis reduction
//!
//! Floating-point LLL driving exact integer row operations.
//!
//! # Overview
//!
//! The reduction keeps floating Gram-Schmidt data for a scaled copy of the
//! basis and uses it to decide every size reduction and swap, while the
//! basis itself (and an optional unimodular transform) is updated exactly.
//! Zero and, on request, short vectors are removed along the way.
//!
//! # Key Components
//!
//! - [`LatticeBasis`] - Lattice basis representation and exact row operations
//! - [`gso`] - Floating Gram-Schmidt orthonormalization of matrix columns
//! - [`LLL`] - LLL lattice reduction with removal
//! - [`GramSchmidt`] - Exact rational Gram-Schmidt, used to verify results
//! - [`TrackedBasis`] - Basis plus transform updated in lockstep
//!
//! # Example
//!
//! ```
//! use lattice_reduce_core::lattice::{LatticeBasis, LLL, LLLConfig};
//!
//! let mut basis = LatticeBasis::from_rows(&[vec![201i64, 37], vec![37, 7]]);
//! let mut transform = LatticeBasis::identity(2);
//!
//! let config = LLLConfig::default();
//! let outcome = LLL::reduce_in_place(&mut basis, Some(&mut transform), &config).unwrap();
//!
//! assert_eq!(outcome.rank, 2);
//! assert!(LLL::is_reduced(&basis, &config));
//! ```

pub mod approx;
pub mod babai;
pub mod basis;
pub mod cache;
pub mod gram_schmidt;
pub mod gso;
pub mod lll;
pub mod transform;

pub use basis::LatticeBasis;
pub use gram_schmidt::GramSchmidt;
pub use gso::{gso, gso_in_place, gso_into};
pub use lll::{
    reduce, GramSchmidtMode, KeepAll, LLLConfig, LLLStats, ReductionOutcome, RemovalPolicy,
    RemoveBelow, LLL,
};
pub use transform::{determinant, is_unimodular, TrackedBasis};
