// Numeric kernels use index loops for clarity.
#![allow(clippy::needless_range_loop)]

//! # rhc-lda
//!
//! Linear algebra and two-class Fisher discriminant analysis for the sphere
//! tree.
//!
//! - **LAPACK-style LU**: `dgetrf` (partial pivoting with a zero-diagonal
//!   fallback), `dgetrs`, inverse and determinant on small dense matrices
//! - **Fisher LDA**: class means, scatter matrices, discriminant direction,
//!   decision point, separability test and a fitted two-class model
//!
//! The sphere tree calls into this crate when the uncovered vectors at a node
//! fall into exactly two classes; a separable fit replaces further spawning
//! at that node.

pub mod fisher;
pub mod lapack;

pub use fisher::{FisherModel, TwoClassData};
pub use lapack::{dgetrf, dot, invert, LuFactors, Matrix};
